//! askama templates for the service-request emails.
//!
//! Customer-facing confirmations are localized through [`Locale`]; admin
//! notifications and status-change emails are always French.

use askama::Template;

/// Languages the customer confirmation is available in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Fr,
    Nl,
}

impl Locale {
    /// Maps a language code to a locale, falling back to French.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Locale::En,
            "nl" => Locale::Nl,
            _ => Locale::Fr,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::Nl => "nl",
        }
    }

    pub fn copy(&self) -> &'static ConfirmationCopy {
        match self {
            Locale::En => &EN,
            Locale::Fr => &FR,
            Locale::Nl => &NL,
        }
    }
}

/// Localized strings for the customer confirmation email.
///
/// Sentences with emphasized values are split around the value so the
/// template controls the markup.
#[derive(Debug)]
pub struct ConfirmationCopy {
    pub subject: &'static str,
    pub thank_you: &'static str,
    pub dear: &'static str,
    pub received_lead: &'static str,
    pub received_at: &'static str,
    pub received_tail: &'static str,
    pub contact_lead: &'static str,
    pub contact_window: &'static str,
    pub contact_at: &'static str,
    pub details: &'static str,
    pub service: &'static str,
    pub address: &'static str,
    pub message: &'static str,
    pub regards: &'static str,
    pub team: &'static str,
    pub footer_line: &'static str,
    pub footer_region: &'static str,
}

static EN: ConfirmationCopy = ConfirmationCopy {
    subject: "Confirmation of your service request - Vide Maison",
    thank_you: "Thank you for your request!",
    dear: "Dear",
    received_lead: "We have received your request for",
    received_at: "at",
    received_tail: ".",
    contact_lead: "Our team will review your request and contact you within",
    contact_window: "24 hours",
    contact_at: "at",
    details: "Your request details:",
    service: "Service",
    address: "Address",
    message: "Message",
    regards: "Best regards,",
    team: "The Vide Maison Team",
    footer_line: "Vide Maison - Professional Clearance Service",
    footer_region: "Brussels and Surroundings",
};

static FR: ConfirmationCopy = ConfirmationCopy {
    subject: "Confirmation de votre demande de service - Vide Maison",
    thank_you: "Merci pour votre demande!",
    dear: "Cher(e)",
    received_lead: "Nous avons bien reçu votre demande pour",
    received_at: "à",
    received_tail: ".",
    contact_lead: "Notre équipe examinera votre demande et vous contactera dans les",
    contact_window: "24 heures",
    contact_at: "au",
    details: "Détails de votre demande:",
    service: "Service",
    address: "Adresse",
    message: "Message",
    regards: "Cordialement,",
    team: "L'équipe Vide Maison",
    footer_line: "Vide Maison - Service Professionnel de Débarras",
    footer_region: "Bruxelles et Environs",
};

static NL: ConfirmationCopy = ConfirmationCopy {
    subject: "Bevestiging van uw serviceaanvraag - Vide Maison",
    thank_you: "Bedankt voor uw aanvraag!",
    dear: "Beste",
    received_lead: "We hebben uw aanvraag voor",
    received_at: "op",
    received_tail: " goed ontvangen.",
    contact_lead: "Ons team zal uw aanvraag bekijken en binnen",
    contact_window: "24 uur",
    contact_at: "contact met u opnemen op",
    details: "Details van uw aanvraag:",
    service: "Dienst",
    address: "Adres",
    message: "Bericht",
    regards: "Met vriendelijke groet,",
    team: "Het Vide Maison Team",
    footer_line: "Vide Maison - Professionele Ontruimingsdienst",
    footer_region: "Brussel en Omgeving",
};

#[derive(Template)]
#[template(
    source = r#"<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; background-color: white; border-radius: 10px; padding: 30px; box-shadow: 0 2px 10px rgba(0,0,0,0.1);">
      <h2 style="color: #d4af37; border-bottom: 2px solid #d4af37; padding-bottom: 10px;">&#128276; Nouvelle Demande de Service</h2>
      <div style="margin: 20px 0;">
        <p style="margin: 10px 0;"><strong>Nom:</strong> {{ name }}</p>
        <p style="margin: 10px 0;"><strong>Email:</strong> {{ email }}</p>
        <p style="margin: 10px 0;"><strong>Téléphone:</strong> {{ phone }}</p>
        <p style="margin: 10px 0;"><strong>Service:</strong> {{ service_name }}</p>
        <p style="margin: 10px 0;"><strong>Adresse:</strong> {{ address }}</p>
        <p style="margin: 10px 0;"><strong>Message:</strong> {{ message }}</p>
        <p style="margin: 10px 0;"><strong>Langue/Language:</strong> {{ language }}</p>
      </div>
      <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee;">
        <p style="color: #666; font-size: 12px;">Soumis le: {{ submitted_at }}</p>
      </div>
    </div>
  </body>
</html>"#,
    ext = "html"
)]
pub struct AdminNewRequestTemplate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub service_name: &'a str,
    pub address: &'a str,
    pub message: &'a str,
    /// Upper-cased language code, e.g. `FR`.
    pub language: String,
    pub submitted_at: String,
}

#[derive(Template)]
#[template(
    source = r#"<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; background-color: white; border-radius: 10px; padding: 30px; box-shadow: 0 2px 10px rgba(0,0,0,0.1);">
      <h2 style="color: #d4af37; text-align: center;">{{ app_name }}</h2>
      <h3 style="color: #333;">{{ copy.thank_you }}</h3>
      <p style="color: #666; line-height: 1.6;">{{ copy.dear }} {{ name }},</p>
      <p style="color: #666; line-height: 1.6;">{{ copy.received_lead }} <strong>{{ service_name }}</strong> {{ copy.received_at }} <strong>{{ address }}</strong>{{ copy.received_tail }}</p>
      <p style="color: #666; line-height: 1.6;">{{ copy.contact_lead }} <strong>{{ copy.contact_window }}</strong> {{ copy.contact_at }} <strong>{{ phone }}</strong>.</p>
      <div style="background-color: #f9f9f9; border-left: 4px solid #d4af37; padding: 15px; margin: 20px 0;">
        <p style="margin: 0; color: #333;"><strong>{{ copy.details }}</strong></p>
        <p style="margin: 5px 0; color: #666;">{{ copy.service }}: {{ service_name }}</p>
        <p style="margin: 5px 0; color: #666;">{{ copy.address }}: {{ address }}</p>
        <p style="margin: 5px 0; color: #666;">{{ copy.message }}: {{ message }}</p>
      </div>
      <p style="color: #666; line-height: 1.6;">{{ copy.regards }}<br><strong>{{ copy.team }}</strong></p>
      <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; text-align: center;">
        <p style="color: #999; font-size: 12px;">{{ copy.footer_line }}<br>{{ copy.footer_region }}</p>
      </div>
    </div>
  </body>
</html>"#,
    ext = "html"
)]
pub struct ConfirmationHtmlTemplate<'a> {
    pub app_name: &'a str,
    pub copy: &'static ConfirmationCopy,
    pub name: &'a str,
    pub phone: &'a str,
    pub service_name: &'a str,
    pub address: &'a str,
    pub message: &'a str,
}

#[derive(Template)]
#[template(
    source = "{{ copy.dear }} {{ name }},

{{ copy.received_lead }} {{ service_name }} {{ copy.received_at }} {{ address }}{{ copy.received_tail }}

{{ copy.contact_lead }} {{ copy.contact_window }} {{ copy.contact_at }} {{ phone }}.

{{ copy.details }}
{{ copy.service }}: {{ service_name }}
{{ copy.address }}: {{ address }}
{{ copy.message }}: {{ message }}

{{ copy.regards }}
{{ copy.team }}
",
    ext = "txt"
)]
pub struct ConfirmationTextTemplate<'a> {
    pub copy: &'static ConfirmationCopy,
    pub name: &'a str,
    pub phone: &'a str,
    pub service_name: &'a str,
    pub address: &'a str,
    pub message: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; background-color: white; border-radius: 10px; padding: 30px;">
      <h2 style="color: #4caf50; text-align: center;">&#9989; Service Terminé!</h2>
      <p style="color: #666;">Cher(e) {{ name }},</p>
      <p style="color: #666;">Nous sommes heureux de vous informer que votre service de débarras à <strong>{{ address }}</strong> a été complété avec succès.</p>
      <p style="color: #666;">Merci d'avoir choisi {{ app_name }}. Nous espérons que notre service a répondu à vos attentes!</p>
      <p style="color: #666;">Cordialement,<br><strong>L'équipe {{ app_name }}</strong></p>
    </div>
  </body>
</html>"#,
    ext = "html"
)]
pub struct RequestCompletedTemplate<'a> {
    pub app_name: &'a str,
    pub name: &'a str,
    pub address: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; background-color: white; border-radius: 10px; padding: 30px;">
      <h2 style="color: #e74c3c; text-align: center;">&#10060; Service Annulé</h2>
      <p style="color: #666;">Cher(e) {{ name }},</p>
      <p style="color: #666;">Nous regrettons de vous informer que votre demande de service à <strong>{{ address }}</strong> a été annulée.</p>
      <p style="color: #666;"><strong>Raison de l'annulation:</strong> {{ reason }}</p>
      <p style="color: #666;">Si vous avez des questions concernant cette annulation, n'hésitez pas à nous contacter.</p>
      <p style="color: #666;">Cordialement,<br><strong>L'équipe {{ app_name }}</strong></p>
    </div>
  </body>
</html>"#,
    ext = "html"
)]
pub struct RequestCancelledTemplate<'a> {
    pub app_name: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    pub reason: &'a str,
}
