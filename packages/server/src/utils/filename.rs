use crate::error::AppError;

const PDF_MIME: &str = "application/pdf";

/// MIME type guessed from a client file name.
pub fn guess_mime(file_name: &str) -> Option<&'static str> {
    mime_guess::from_path(file_name).first_raw()
}

/// Require a PDF document, judged by the file name the client sent.
pub fn ensure_pdf(file_name: &str) -> Result<(), AppError> {
    if guess_mime(file_name) == Some(PDF_MIME) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "El formato de baja debe ser un archivo PDF".into(),
        ))
    }
}
