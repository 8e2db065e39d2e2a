use std::path::PathBuf;

use crate::{FileTransport, Mailer, MailerError, SmtpSecurity, SmtpTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        security: SmtpSecurity,
    },
    File {
        output_dir: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub app_name: String,
    pub from_address: String,
    /// Recipient of new service-request notifications.
    pub admin_email: String,
    pub transport: TransportConfig,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            app_name: "Vide Maison".to_string(),
            from_address: "noreply@videmaison.be".to_string(),
            admin_email: "admin@videmaison.be".to_string(),
            transport: TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            },
        }
    }
}

impl MailerConfig {
    /// Reads `MAIL_*` variables from the process environment.
    ///
    /// Without `MAIL_SERVER` the file transport is used, writing to
    /// `MAIL_FILE_OUTPUT_DIR` (default `./emails`).
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let transport = match non_empty("MAIL_SERVER") {
            Some(host) => {
                let port = match non_empty("MAIL_PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                        MailerError::Config(format!("MAIL_PORT must be a port number, got {raw}"))
                    })?,
                    None => 587,
                };
                let security = SmtpSecurity::from_flags(
                    non_empty("MAIL_USE_SSL").map(|v| is_truthy(&v)),
                    non_empty("MAIL_USE_TLS").map(|v| is_truthy(&v)),
                );
                TransportConfig::Smtp {
                    host,
                    port,
                    username: non_empty("MAIL_USERNAME"),
                    password: non_empty("MAIL_PASSWORD"),
                    security,
                }
            }
            None => TransportConfig::File {
                output_dir: non_empty("MAIL_FILE_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./emails")),
            },
        };

        let from_address = non_empty("MAIL_DEFAULT_SENDER")
            .or_else(|| non_empty("MAIL_USERNAME"))
            .unwrap_or(defaults.from_address);

        Ok(Self {
            app_name: non_empty("APP_NAME").unwrap_or(defaults.app_name),
            admin_email: non_empty("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            from_address,
            transport,
        })
    }

    pub fn get_from_address(&self) -> String {
        if self.from_address.contains('<') {
            self.from_address.clone()
        } else {
            format!("{} <{}>", self.app_name, self.from_address)
        }
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                security,
            } => Ok(Box::new(SmtpTransport::connect(
                host,
                *port,
                *security,
                username.as_deref(),
                password.as_deref(),
            )?)),
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
