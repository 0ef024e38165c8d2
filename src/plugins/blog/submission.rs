use chrono::{NaiveDate, Utc};

use crate::db::BlogStore;
use crate::error::{PublishError, ValidationError};
use crate::plugins::blog::models::{BlogForm, BlogRecord, DEFAULT_IMAGE};

/// Lower-cases `title` and turns every run of whitespace into one hyphen.
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(ch);
            in_space = false;
        }
    }
    slug
}

/// Checkbox flag from a form: only the literal `"true"` is true.
pub fn parse_featured(value: Option<&str>) -> bool {
    value == Some("true")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

/// Fills in defaults and checks required fields. Pure: `today` and the
/// stored image name come from the caller.
pub fn build_record(form: BlogForm, image: Option<String>, today: NaiveDate) -> Result<BlogRecord, ValidationError> {
    let mut missing = Vec::new();
    let title = required(form.title, "title", &mut missing);
    let category = required(form.category, "category", &mut missing);
    let content = required(form.content, "content", &mut missing);
    let author = required(form.author, "author", &mut missing);
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let slug = non_empty(form.slug).unwrap_or_else(|| derive_slug(&title));
    let date = non_empty(form.date).unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    Ok(BlogRecord {
        title,
        category,
        subtitle: form.subtitle,
        content,
        author,
        position: form.position,
        date,
        image: image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        slug,
        featured: parse_featured(form.featured.as_deref()),
        extra: Default::default(),
    })
}

/// Builds the record for one submission and stores it at the front of the
/// collection. The returned record is exactly what was persisted.
pub async fn handle_create(store: &BlogStore, form: BlogForm, image: Option<String>) -> Result<BlogRecord, PublishError> {
    let record = build_record(form, image, Utc::now().date_naive())?;
    store
        .prepend_and_save(record.clone())
        .await
        .map_err(PublishError::Persistence)?;
    Ok(record)
}
