use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::time::Duration;
use tracing::info;

use crate::config::EmailSettings;
use crate::error::{InvoiceError, Result};
use crate::invoice::{display_date, format_money, InvoiceFigures};

/// Outcome of a send, as reported by the email API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: String,
    pub status: String,
}

/// Dispatches one invoice email with the filled document attached.
pub trait Mailer: Sync {
    fn send(
        &self,
        figures: &InvoiceFigures,
        to: &str,
        attachment: &[u8],
        filename: &str,
    ) -> Result<Delivery>;
}

/// Embedded HTML body; placeholders are substituted per record.
const HTML_TEMPLATE: &str = r#"<html>
  <body>
    <p>Hi {stylist},</p>
    <p>Your invoice <strong>{invoice}</strong> for the period
       {period_from} to {period_to} is attached.</p>
    <table cellpadding="4">
      <tr><td>Service turnover</td><td align="right">{services}</td></tr>
      <tr><td>Product turnover</td><td align="right">{products}</td></tr>
      <tr><td>Tips</td><td align="right">{tips}</td></tr>
      <tr><td><strong>Total charges</strong></td><td align="right"><strong>{total_charge}</strong></td></tr>
      <tr><td><strong>Total released to you</strong></td><td align="right"><strong>{total_release}</strong></td></tr>
    </table>
    <p>Any questions, just reply to this email.</p>
  </body>
</html>
"#;

/// Embedded plain-text fallback body.
const TEXT_TEMPLATE: &str = r#"Hi {stylist},

Your invoice {invoice} for the period {period_from} to {period_to} is
attached.

  Service turnover:      {services}
  Product turnover:      {products}
  Tips:                  {tips}
  Total charges:         {total_charge}
  Total released to you: {total_release}

Any questions, just reply to this email.
"#;

fn render(template: &str, figures: &InvoiceFigures, symbol: &str) -> String {
    template
        .replace("{stylist}", &figures.stylist)
        .replace("{invoice}", &figures.invoice)
        .replace("{date}", &display_date(figures.date))
        .replace("{period_from}", &display_date(figures.period_from))
        .replace("{period_to}", &display_date(figures.period_to))
        .replace("{services}", &format_money(figures.services, symbol))
        .replace("{products}", &format_money(figures.products, symbol))
        .replace("{tips}", &format_money(figures.tips, symbol))
        .replace("{total_charge}", &format_money(figures.total_charge, symbol))
        .replace(
            "{total_release}",
            &format_money(figures.total_release, symbol),
        )
}

/// Client for a Postmark-style transactional email API. The whole exchange
/// is bounded by the agent's global timeout.
#[derive(Debug)]
pub struct EmailClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
    from: String,
    subject: String,
    symbol: String,
}

impl EmailClient {
    pub fn from_settings(settings: &EmailSettings, symbol: &str) -> Result<Self> {
        let token = std::env::var(&settings.token_env)
            .map_err(|_| InvoiceError::EmailTokenMissing(settings.token_env.clone()))?;

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .build()
            .into();

        Ok(Self {
            agent,
            api_url: settings.api_url.clone(),
            token,
            from: settings.from.clone(),
            subject: settings.subject.clone(),
            symbol: symbol.to_string(),
        })
    }

    fn subject_for(&self, figures: &InvoiceFigures) -> String {
        self.subject
            .replace("{invoice}", &figures.invoice)
            .replace("{date}", &display_date(figures.date))
    }
}

impl Mailer for EmailClient {
    fn send(
        &self,
        figures: &InvoiceFigures,
        to: &str,
        attachment: &[u8],
        filename: &str,
    ) -> Result<Delivery> {
        let send_err = |reason: String| InvoiceError::EmailSend {
            stylist: figures.stylist.clone(),
            invoice: figures.invoice.clone(),
            reason,
        };

        let payload = serde_json::json!({
            "From": self.from,
            "To": to,
            "Subject": self.subject_for(figures),
            "HtmlBody": render(HTML_TEMPLATE, figures, &self.symbol),
            "TextBody": render(TEXT_TEMPLATE, figures, &self.symbol),
            "Attachments": [{
                "Name": filename,
                "Content": BASE64.encode(attachment),
                "ContentType": "application/pdf",
            }],
        });

        let body: String = self
            .agent
            .post(self.api_url.as_str())
            .header("Accept", "application/json")
            .header("X-Postmark-Server-Token", self.token.as_str())
            .send_json(&payload)
            .map_err(|e| send_err(e.to_string()))?
            .body_mut()
            .read_to_string()
            .map_err(|e| send_err(e.to_string()))?;

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| send_err(e.to_string()))?;

        let error_code = json["ErrorCode"].as_i64().unwrap_or(0);
        if error_code != 0 {
            let message = json["Message"].as_str().unwrap_or("unknown API error");
            return Err(send_err(format!("API error {error_code}: {message}")));
        }

        let delivery = Delivery {
            id: json["MessageID"].as_str().unwrap_or_default().to_string(),
            status: json["Message"].as_str().unwrap_or("OK").to_string(),
        };
        info!(
            stylist = %figures.stylist,
            invoice = %figures.invoice,
            delivery = %delivery.id,
            "invoice email sent"
        );
        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RawRecord;
    use crate::config::Rates;
    use crate::invoice::compute;
    use chrono::NaiveDate;

    fn figures() -> InvoiceFigures {
        let record = RawRecord {
            stylist: "Sam Carter".to_string(),
            invoice: "1041".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 5, 21).unwrap(),
            period_from: NaiveDate::from_ymd_opt(2022, 5, 9).unwrap(),
            period_to: NaiveDate::from_ymd_opt(2022, 5, 20).unwrap(),
            weeks: 4,
            services: 1000.0,
            products: 200.0,
            tips: 50.0,
            extra: 0.0,
        };
        let rates = Rates {
            commission: 0.45,
            weekly: 5.00,
            vat: 0.20,
            retail_cost: 0.5,
            retail_commission: 0.4,
        };
        compute(&record, &rates)
    }

    #[test]
    fn html_body_substitutes_every_placeholder() {
        let body = render(HTML_TEMPLATE, &figures(), "£");
        assert!(body.contains("Hi Sam Carter,"));
        assert!(body.contains("<strong>1041</strong>"));
        assert!(body.contains("09-05-2022"));
        assert!(body.contains("20-05-2022"));
        assert!(body.contains("£1000.00"));
        assert!(body.contains("£565.00"));
        assert!(!body.contains('{'));
    }

    #[test]
    fn text_body_substitutes_every_placeholder() {
        let body = render(TEXT_TEMPLATE, &figures(), "£");
        assert!(body.contains("invoice 1041"));
        assert!(body.contains("Tips:                  £50.00"));
        assert!(!body.contains('{'));
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let settings: EmailSettings = toml::from_str(
            r#"
            enabled = true
            api_url = "https://api.postmarkapp.com/email"
            token_env = "SALON_INVOICE_TEST_TOKEN_THAT_IS_NOT_SET"
            from = "accounts@example.com"
            subject = "Your invoice {invoice}"
            "#,
        )
        .unwrap();

        let err = EmailClient::from_settings(&settings, "£").unwrap_err();
        assert!(matches!(err, InvoiceError::EmailTokenMissing(_)));
    }
}
