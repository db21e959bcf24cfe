//! Printable document service
//!
//! Assembles the HTML for quotes, work orders, delivery notes and glass
//! labels, and hands it to the external render service for PDF output.
//! Layout lives in the templates here; rasterization is not this
//! service's concern.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::documents::{DocumentKind, DocumentRenderClient};
use crate::services::delivery_notes::DeliveryNoteService;
use crate::services::quotes::QuoteService;
use crate::services::work_orders::WorkOrderService;
use shared::models::{DeliveryNote, Quote, QuoteTotals, WorkOrder, WorkOrderItem};

/// A rendered document ready to send to the client
#[derive(Debug)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Document service
#[derive(Clone)]
pub struct DocumentService {
    db: PgPool,
    renderer: DocumentRenderClient,
}

impl DocumentService {
    /// Create a new DocumentService instance
    pub fn new(db: PgPool, renderer: DocumentRenderClient) -> Self {
        Self { db, renderer }
    }

    /// Render a quote PDF
    pub async fn render_quote(&self, quote_id: Uuid) -> AppResult<RenderedDocument> {
        let quote = QuoteService::new(self.db.clone()).get_quote(quote_id).await?;
        let client_name = self.client_name(quote.quote.client_id).await?;

        let html = quote_html(&quote.quote, &quote.totals, &client_name);
        let filename = format!("{}.pdf", quote.quote.quote_number);
        let bytes = self
            .renderer
            .render(DocumentKind::Quote, &filename, &html)
            .await?;

        Ok(RenderedDocument { filename, bytes })
    }

    /// Render a work order PDF
    pub async fn render_work_order(&self, order_id: Uuid) -> AppResult<RenderedDocument> {
        let order = WorkOrderService::new(self.db.clone()).get_order(order_id).await?;
        let client_name = self.client_name(order.client_id).await?;

        let html = work_order_html(&order, &client_name);
        let filename = format!("{}.pdf", order.order_number);
        let bytes = self
            .renderer
            .render(DocumentKind::WorkOrder, &filename, &html)
            .await?;

        Ok(RenderedDocument { filename, bytes })
    }

    /// Render a delivery note PDF
    pub async fn render_delivery_note(&self, note_id: Uuid) -> AppResult<RenderedDocument> {
        let note = DeliveryNoteService::new(self.db.clone()).get_note(note_id).await?;
        let client_name = self.client_name(note.client_id).await?;

        let html = delivery_note_html(&note, &client_name);
        let filename = format!("{}.pdf", note.delivery_number);
        let bytes = self
            .renderer
            .render(DocumentKind::DeliveryNote, &filename, &html)
            .await?;

        Ok(RenderedDocument { filename, bytes })
    }

    /// Render the glass labels for a work order, one per product line
    pub async fn render_glass_labels(&self, order_id: Uuid) -> AppResult<RenderedDocument> {
        let order = WorkOrderService::new(self.db.clone()).get_order(order_id).await?;
        let client_name = self.client_name(order.client_id).await?;

        let html = glass_labels_html(&order, &client_name);
        let filename = format!("{}-labels.pdf", order.order_number);
        let bytes = self
            .renderer
            .render(DocumentKind::GlassLabel, &filename, &html)
            .await?;

        Ok(RenderedDocument { filename, bytes })
    }

    async fn client_name(&self, client_id: Uuid) -> AppResult<String> {
        sqlx::query_scalar::<_, String>("SELECT name FROM clients WHERE id = $1")
            .bind(client_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Client".to_string()))
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn document_head(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="hr"><head><meta charset="utf-8"><title>{}</title>
<style>
body {{ font-family: sans-serif; font-size: 12px; margin: 24px; }}
h1 {{ font-size: 18px; }}
table {{ width: 100%; border-collapse: collapse; margin-top: 12px; }}
th, td {{ border: 1px solid #888; padding: 4px 8px; text-align: left; }}
.totals td {{ border: none; text-align: right; }}
.label {{ border: 1px dashed #444; padding: 12px; margin: 8px 0; page-break-inside: avoid; }}
</style></head><body>"#,
        html_escape(title)
    )
}

fn item_rows(items: &[WorkOrderItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{} × {} mm</td><td>{}</td><td>{}</td></tr>",
                html_escape(item.reference.name()),
                item.quantity,
                item.dimensions.width_mm,
                item.dimensions.height_mm,
                item.unit_price,
                item.line_total()
            )
        })
        .collect()
}

fn quote_html(quote: &Quote, totals: &QuoteTotals, client_name: &str) -> String {
    format!(
        r#"{head}<h1>Ponuda {number}</h1>
<p>Klijent: {client}</p>
<table><tr><th>Stavka</th><th>Kol.</th><th>Dimenzije</th><th>Cijena</th><th>Iznos</th></tr>{rows}</table>
<table class="totals">
<tr><td>Osnovica: {subtotal} EUR</td></tr>
<tr><td>PDV ({vat_rate}%): {vat} EUR</td></tr>
<tr><td><strong>Ukupno: {total} EUR</strong></td></tr>
</table></body></html>"#,
        head = document_head(&quote.quote_number),
        number = html_escape(&quote.quote_number),
        client = html_escape(client_name),
        rows = item_rows(&quote.items),
        subtotal = totals.subtotal,
        vat_rate = quote.vat_rate,
        vat = totals.vat_amount,
        total = totals.total,
    )
}

fn work_order_html(order: &WorkOrder, client_name: &str) -> String {
    format!(
        r#"{head}<h1>Radni nalog {number}</h1>
<p>Klijent: {client}</p><p>Status: {status}</p>
<table><tr><th>Stavka</th><th>Kol.</th><th>Dimenzije</th><th>Cijena</th><th>Iznos</th></tr>{rows}</table>
</body></html>"#,
        head = document_head(&order.order_number),
        number = html_escape(&order.order_number),
        client = html_escape(client_name),
        status = order.status,
        rows = item_rows(&order.items),
    )
}

fn delivery_note_html(note: &DeliveryNote, client_name: &str) -> String {
    let rows: String = note
        .items
        .iter()
        .map(|item| {
            let dimensions = item
                .dimensions
                .map(|d| format!("{} × {} mm", d.width_mm, d.height_mm))
                .unwrap_or_default();
            format!(
                "<tr><td>{}</td><td>{} {}</td><td>{}</td></tr>",
                html_escape(&item.description),
                item.quantity,
                item.unit,
                dimensions
            )
        })
        .collect();

    format!(
        r#"{head}<h1>Otpremnica {number}</h1>
<p>Klijent: {client}</p>
<table><tr><th>Stavka</th><th>Količina</th><th>Dimenzije</th></tr>{rows}</table>
</body></html>"#,
        head = document_head(&note.delivery_number),
        number = html_escape(&note.delivery_number),
        client = html_escape(client_name),
        rows = rows,
    )
}

fn glass_labels_html(order: &WorkOrder, client_name: &str) -> String {
    let labels: String = order
        .items
        .iter()
        .filter(|item| !item.is_service())
        .map(|item| {
            format!(
                r#"<div class="label"><strong>{}</strong><br>{}<br>{} × {} mm, {} kom<br>{}</div>"#,
                html_escape(&order.order_number),
                html_escape(client_name),
                item.dimensions.width_mm,
                item.dimensions.height_mm,
                item.quantity,
                html_escape(item.reference.name()),
            )
        })
        .collect();

    format!(
        "{head}{labels}</body></html>",
        head = document_head(&order.order_number),
        labels = labels,
    )
}
