//! HTML page rendering.

use minijinja::{AutoEscape, Environment, context};
use once_cell::sync::Lazy;

use crate::flash::Flash;
use crate::intake::FILE_FIELD;

static PAGES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    // Inline templates have no file extension to infer escaping from.
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
});

const HOME: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>File upload</title>
</head>
<body>
  <h1>Upload a file</h1>
  {% if flash %}<p class="{{ flash.level }}">{{ flash.text }}</p>{% endif %}
  {% if error %}<p class="error">{{ error }}</p>{% endif %}
  <form method="post" action="/upload" enctype="multipart/form-data">
    <input type="file" name="{{ field }}" required>
    <button type="submit">Upload</button>
  </form>
</body>
</html>
"#;

/// Render the upload form with an optional flash and page-level error.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn home(flash: Option<&Flash>, error: Option<&str>) -> Result<String, minijinja::Error> {
    PAGES.render_str(HOME, context! { flash, error, field => FILE_FIELD })
}
