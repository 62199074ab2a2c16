use actix_web::post;
use actix_web::web::{Data, Json};

use crate::envelope::Envelope;
use crate::error::Error;

use super::mailer::{MailEnvelope, Mailer};
use super::{SupportRequest, SupportRequestBody};

#[post("/api/support")]
#[tracing::instrument(skip(mailer, body))]
async fn request_support(
    mailer: Data<Box<dyn Mailer>>,
    body: Json<SupportRequestBody>,
) -> Result<Envelope<&'static str>, Error> {
    let request = SupportRequest::from_body(body.into_inner())?;

    mailer
        .send(MailEnvelope {
            cc: Some(request.email.clone()),
            subject: request.subject(),
            html: request.render_html(),
        })
        .await?;

    Ok(Envelope::ok("message", "Mail sent successfully"))
}
