use crate::locale::{Locale, DEFAULT_LOCALE};
use secrecy::SecretString;
use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// IP address the HTTP listener binds to
    pub ip: IpAddr,

    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentSettings {
    pub blog_dir: PathBuf,
    pub legal_dir: PathBuf,
    pub locales_dir: PathBuf,
    #[serde(default = "default_locale")]
    pub default_locale: Locale,
    /// Blog index page size.
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_locale() -> Locale {
    DEFAULT_LOCALE
}

fn default_per_page() -> usize {
    9
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub api_url: String,
    pub api_key: SecretString,
    /// Sender for both acknowledgment and notification mails.
    pub from: String,
    /// Internal recipients of contact-form notifications.
    pub notify_to: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrarSettings {
    pub api_url: String,
    pub username: String,
    pub password: SecretString,
    /// TLDs tried for bare search terms, in display order.
    #[serde(default = "default_tlds")]
    pub tlds: Vec<String>,
}

fn default_tlds() -> Vec<String> {
    ["com", "net", "org", "io", "dev"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    pub base_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub content: ContentSettings,
    pub email: Option<EmailSettings>,
    pub registrar: Option<RegistrarSettings>,
    #[serde(default)]
    pub site: SiteSettings,
}

impl Settings {
    /// Make relative content directories relative to `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        for dir in [
            &mut self.content.blog_dir,
            &mut self.content.legal_dir,
            &mut self.content.locales_dir,
        ] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
        self
    }
}
