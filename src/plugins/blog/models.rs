use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Image reference stored when a post is submitted without an upload.
pub const DEFAULT_IMAGE: &str = "default-author.jpg";

/// One post as stored in the backing file and served to the front-end.
///
/// Keys missing from a stored record, or set to `null`, load as empty
/// values. Keys this type does not know about are carried through a rewrite
/// untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BlogRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Text fields of a create-post form, exactly as submitted.
#[derive(Debug, Default, Clone)]
pub struct BlogForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub subtitle: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub position: Option<String>,
    pub date: Option<String>,
    pub slug: Option<String>,
    pub featured: Option<String>,
}

impl BlogForm {
    /// Later duplicates of a field win; unknown fields are ignored.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = BlogForm::default();
        for (name, value) in fields {
            let slot = match name.as_str() {
                "title" => &mut form.title,
                "category" => &mut form.category,
                "subtitle" => &mut form.subtitle,
                "content" => &mut form.content,
                "author" => &mut form.author,
                "position" => &mut form.position,
                "date" => &mut form.date,
                "slug" => &mut form.slug,
                "featured" => &mut form.featured,
                _ => continue,
            };
            *slot = Some(value);
        }
        form
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateResponse {
    pub success: bool,
    pub blog: BlogRecord,
}
