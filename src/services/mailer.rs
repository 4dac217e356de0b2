//! Notification gateway.
//!
//! Sends one-time codes and enquiry notifications via SMTP using the
//! lettre crate, as multipart plain text + HTML messages.

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Enquiry, ProductRef};

/// Email dispatcher, built once at startup and shared with all handlers.
/// When SMTP is not configured the transport is absent and every send
/// fails with a logged error; the callers decide whether that matters.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
    from_name: String,
}

impl Mailer {
    /// Creates a mailer from SMTP settings
    pub fn from_config(config: &SmtpConfig) -> Self {
        let transport = config
            .host
            .as_ref()
            .and_then(|host| match build_transport(host, config) {
                Ok(transport) => Some(transport),
                Err(e) => {
                    log::error!("Failed to build SMTP transport: {}", e);
                    None
                }
            });

        if transport.is_none() {
            log::warn!("SMTP not configured, outbound email is disabled");
        }

        Self {
            transport,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        }
    }

    /// Sends a one-time sign-in code to the configured admin address
    pub async fn send_otp_email(&self, to: &str, code: &str, ttl_minutes: i64) -> AppResult<()> {
        let subject = format!("{} sign-in code", self.from_name);
        let text = format_otp_text(code, ttl_minutes);
        let html = format_otp_html(code, ttl_minutes);

        self.send(to, &subject, None, text, html).await
    }

    /// Sends the admin notification for a new enquiry. Reply-to points at
    /// the enquirer when an email address was provided.
    pub async fn send_enquiry_email(
        &self,
        to: &str,
        enquiry: &Enquiry,
        product_names: &[String],
        legacy_product: Option<&ProductRef>,
    ) -> AppResult<()> {
        let subject = enquiry_subject(enquiry, product_names, legacy_product);
        let text = format_enquiry_text(enquiry, product_names, legacy_product);
        let html = format_enquiry_html(enquiry, product_names, legacy_product);

        self.send(to, &subject, enquiry.email.as_deref(), text, html)
            .await
    }

    async fn send(
        &self,
        to: &str,
        subject: &str,
        reply_to: Option<&str>,
        text: String,
        html: String,
    ) -> AppResult<()> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| AppError::Internal("SMTP transport not configured".to_string()))?;

        let from: Mailbox = format!("{} <{}>", self.from_name, self.from_address)
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid sender address: {}", e)))?;

        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid recipient address: {}", e)))?;

        let mut builder = Message::builder().from(from).to(to).subject(subject);

        if let Some(reply_to) = reply_to {
            if let Ok(mailbox) = reply_to.parse::<Mailbox>() {
                builder = builder.reply_to(mailbox);
            }
        }

        let email = builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        transport
            .send(email)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        log::debug!("Email sent: {}", subject);
        Ok(())
    }
}

/// Builds the SMTP transport.
/// Port 465 = implicit TLS (SMTPS), anything else = STARTTLS.
fn build_transport(
    host: &str,
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let builder = if config.port == 465 {
        let tls_params = TlsParameters::new(host.to_string())
            .map_err(|e| format!("invalid TLS parameters for {}: {}", host, e))?;

        AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map(|b| b.port(config.port).tls(Tls::Wrapper(tls_params)))
            .map_err(|e| format!("invalid SMTP host {}: {}", host, e))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map(|b| b.port(config.port))
            .map_err(|e| format!("invalid SMTP host {}: {}", host, e))?
    };

    let transport = match (&config.username, &config.password) {
        (Some(username), Some(password)) => builder
            .credentials(Credentials::new(username.clone(), password.clone()))
            .build(),
        _ => builder.build(),
    };

    Ok(transport)
}

// =============================================================================
// Formatting
// =============================================================================

fn format_otp_text(code: &str, ttl_minutes: i64) -> String {
    format!(
        "Your sign-in code is: {code}\n\n\
         It expires in {ttl_minutes} minutes and can be used once.\n\
         If you did not request this code, you can ignore this email."
    )
}

fn format_otp_html(code: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<div style="font:14px/1.6 -apple-system,Segoe UI,Roboto,Arial;color:#111">
  <h2 style="margin:0 0 12px;font-size:18px;">Your sign-in code</h2>
  <p style="margin:0 0 16px;font-size:28px;font-weight:700;letter-spacing:6px;">{code}</p>
  <p style="margin:0;font-size:13px;color:#6b7280;">
    Expires in {ttl_minutes} minutes and can be used once.
    If you did not request this code, you can ignore this email.
  </p>
</div>"#,
        code = html_escape(code),
        ttl_minutes = ttl_minutes,
    )
}

/// Subject: "New enquiry • category • products • name", omitting the
/// parts that do not apply
fn enquiry_subject(
    enquiry: &Enquiry,
    product_names: &[String],
    legacy_product: Option<&ProductRef>,
) -> String {
    let product_part = if enquiry.all_products_of_category {
        Some("• Entire category".to_string())
    } else if !product_names.is_empty() {
        Some(format!("• {} product(s)", product_names.len()))
    } else {
        legacy_product.map(|p| format!("• {}", p.name))
    };

    ["New enquiry".to_string()]
        .into_iter()
        .chain(
            enquiry
                .category_name
                .as_ref()
                .map(|c| format!("• {}", c)),
        )
        .chain(product_part)
        .chain(Some(format!("• {}", enquiry.name)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn products_line(
    enquiry: &Enquiry,
    product_names: &[String],
    legacy_product: Option<&ProductRef>,
) -> String {
    if enquiry.all_products_of_category {
        "Entire category".to_string()
    } else if !product_names.is_empty() {
        product_names.join(", ")
    } else {
        legacy_product
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "—".to_string())
    }
}

fn format_enquiry_text(
    enquiry: &Enquiry,
    product_names: &[String],
    legacy_product: Option<&ProductRef>,
) -> String {
    let dash = "—".to_string();
    format!(
        "New enquiry received\n\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Topic: {topic}\n\
         Category: {category}\n\
         Products: {products}\n\
         Received At: {received}\n\n\
         Message:\n{message}",
        name = enquiry.name,
        email = enquiry.email.as_ref().unwrap_or(&dash),
        phone = enquiry.phone.as_ref().unwrap_or(&dash),
        topic = enquiry.topic.as_ref().unwrap_or(&dash),
        category = enquiry.category_name.as_ref().unwrap_or(&dash),
        products = products_line(enquiry, product_names, legacy_product),
        received = enquiry.created_at.to_rfc3339(),
        message = enquiry.message,
    )
}

fn format_enquiry_html(
    enquiry: &Enquiry,
    product_names: &[String],
    legacy_product: Option<&ProductRef>,
) -> String {
    let dash = "—".to_string();
    let rows = [
        ("Name", enquiry.name.clone()),
        ("Email", enquiry.email.clone().unwrap_or_else(|| dash.clone())),
        ("Phone", enquiry.phone.clone().unwrap_or_else(|| dash.clone())),
        ("Topic", enquiry.topic.clone().unwrap_or_else(|| dash.clone())),
        (
            "Category",
            enquiry.category_name.clone().unwrap_or_else(|| dash.clone()),
        ),
        (
            "Products",
            products_line(enquiry, product_names, legacy_product),
        ),
        ("Received At", enquiry.created_at.to_rfc3339()),
    ]
    .iter()
    .map(|(key, value)| {
        format!(
            r#"<tr>
  <td style="background:#fafafa;border-bottom:1px solid #eee;padding:10px 12px;width:180px;font-weight:600;">{}</td>
  <td style="border-bottom:1px solid #eee;padding:10px 12px;">{}</td>
</tr>"#,
            html_escape(key),
            html_escape(value),
        )
    })
    .collect::<String>();

    format!(
        r#"<div style="font:14px/1.6 -apple-system,Segoe UI,Roboto,Arial;color:#111">
  <h2 style="margin:0 0 12px;font-size:18px;">New enquiry received</h2>
  <table role="presentation" cellspacing="0" cellpadding="0"
         style="border-collapse:collapse;width:100%;max-width:720px;border:1px solid #eee;border-radius:8px;overflow:hidden">
    <tbody>
      {rows}
    </tbody>
  </table>
  <p style="margin:18px 0 6px;font-weight:600;">Message</p>
  <pre style="white-space:pre-wrap;background:#f6f7f8;padding:12px;border-radius:6px;border:1px solid #eee;margin:0;">{message}</pre>
</div>"#,
        rows = rows,
        message = html_escape(&enquiry.message),
    )
}

/// Simple HTML escaping for email content
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
