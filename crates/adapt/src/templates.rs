// crates/adapt/src/templates.rs

//! Handlebars templates for contact-form mail. Values are HTML-escaped by
//! the default handlebars escape function.

use handlebars::Handlebars;
use serde::Serialize;

use crate::Error;

pub const ACK_TEMPLATE: &str = "contact_ack";
pub const NOTIFY_TEMPLATE: &str = "contact_notify";

const ACK_HTML: &str = r#"<!doctype html>
<html lang="{{lang}}">
  <body>
    <p>{{greeting}}</p>
    <p>{{intro}}</p>
    <blockquote>{{message}}</blockquote>
    <p><small>{{reference_line}}</small></p>
    <p>{{signature}}</p>
  </body>
</html>
"#;

const NOTIFY_HTML: &str = r#"<!doctype html>
<html lang="en">
  <body>
    <h2>New contact form message</h2>
    <table>
      <tr><th align="left">Reference</th><td>{{reference}}</td></tr>
      <tr><th align="left">Name</th><td>{{name}}</td></tr>
      <tr><th align="left">Email</th><td>{{email}}</td></tr>
      <tr><th align="left">Subject</th><td>{{#if subject}}{{subject}}{{else}}(none){{/if}}</td></tr>
      <tr><th align="left">Locale</th><td>{{locale}}</td></tr>
    </table>
    <pre>{{message}}</pre>
  </body>
</html>
"#;

#[derive(Debug, Serialize)]
pub struct AckModel<'a> {
    pub lang: &'a str,
    pub greeting: String,
    pub intro: String,
    pub message: &'a str,
    pub reference_line: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct NotifyModel<'a> {
    pub reference: String,
    pub name: &'a str,
    pub email: &'a str,
    pub subject: Option<&'a str>,
    pub locale: &'a str,
    pub message: &'a str,
}

pub struct MailTemplates {
    registry: Handlebars<'static>,
}

impl MailTemplates {
    pub fn new() -> Result<Self, Error> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_template_string(ACK_TEMPLATE, ACK_HTML)?;
        registry.register_template_string(NOTIFY_TEMPLATE, NOTIFY_HTML)?;
        Ok(Self { registry })
    }

    pub fn ack(&self, model: &AckModel<'_>) -> Result<String, Error> {
        Ok(self.registry.render(ACK_TEMPLATE, model)?)
    }

    pub fn notify(&self, model: &NotifyModel<'_>) -> Result<String, Error> {
        Ok(self.registry.render(NOTIFY_TEMPLATE, model)?)
    }
}
