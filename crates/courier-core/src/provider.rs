//! Named SMTP providers
//!
//! Operators pick a provider by name; the relay submits on port 587 with
//! STARTTLS to the provider's host.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmtpProvider {
    Gmail,
    Outlook,
    Yahoo,
    Zoho,
    Sendgrid,
    Mailgun,
    Yandex,
    Protonmail,
    Icloud,
    Aol,
    Zohomail,
    Gmx,
}

impl SmtpProvider {
    pub const ALL: [SmtpProvider; 12] = [
        SmtpProvider::Gmail,
        SmtpProvider::Outlook,
        SmtpProvider::Yahoo,
        SmtpProvider::Zoho,
        SmtpProvider::Sendgrid,
        SmtpProvider::Mailgun,
        SmtpProvider::Yandex,
        SmtpProvider::Protonmail,
        SmtpProvider::Icloud,
        SmtpProvider::Aol,
        SmtpProvider::Zohomail,
        SmtpProvider::Gmx,
    ];

    /// Used when no provider is configured or the name is unknown
    pub const DEFAULT: SmtpProvider = SmtpProvider::Outlook;

    pub fn name(self) -> &'static str {
        match self {
            SmtpProvider::Gmail => "gmail",
            SmtpProvider::Outlook => "outlook",
            SmtpProvider::Yahoo => "yahoo",
            SmtpProvider::Zoho => "zoho",
            SmtpProvider::Sendgrid => "sendgrid",
            SmtpProvider::Mailgun => "mailgun",
            SmtpProvider::Yandex => "yandex",
            SmtpProvider::Protonmail => "protonmail",
            SmtpProvider::Icloud => "icloud",
            SmtpProvider::Aol => "aol",
            SmtpProvider::Zohomail => "zohomail",
            SmtpProvider::Gmx => "gmx",
        }
    }

    pub fn host(self) -> &'static str {
        match self {
            SmtpProvider::Gmail => "smtp.gmail.com",
            SmtpProvider::Outlook => "smtp.office365.com",
            SmtpProvider::Yahoo => "smtp.mail.yahoo.com",
            SmtpProvider::Zoho => "smtp.zoho.com",
            SmtpProvider::Sendgrid => "smtp.sendgrid.net",
            SmtpProvider::Mailgun => "smtp.mailgun.org",
            SmtpProvider::Yandex => "smtp.yandex.com",
            SmtpProvider::Protonmail => "smtp.protonmail.com",
            SmtpProvider::Icloud => "smtp.mail.me.com",
            SmtpProvider::Aol => "smtp.aol.com",
            SmtpProvider::Zohomail => "smtp.zoho.eu",
            SmtpProvider::Gmx => "smtp.gmx.com",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Resolve the configured name, falling back to [`Self::DEFAULT`]
    pub fn resolve(configured: Option<&str>) -> Self {
        match configured {
            None => Self::DEFAULT,
            Some(name) => Self::from_name(name).unwrap_or_else(|| {
                tracing::warn!(
                    provider = name,
                    fallback = Self::DEFAULT.name(),
                    "unknown SMTP provider, using default"
                );
                Self::DEFAULT
            }),
        }
    }
}

impl fmt::Display for SmtpProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
