use serde::{de, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Flat document fields holding the recent-search slots, most recent first.
pub const RECENT_SEARCH_FIELDS: [&str; 5] = ["rs1", "rs2", "rs3", "rs4", "rs5"];

pub const USERNAME_FIELD: &str = "username";
pub const PASSWORD_FIELD: &str = "password";
pub const RESUME_PATH_FIELD: &str = "resume_path";

/// One prior job query recorded against a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    pub location: String,
    /// Always held as text; numeric input is normalized on the way in.
    #[serde(default, deserialize_with = "salary_as_text")]
    pub med_salary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Accepts a median salary given either as a JSON string or a JSON number.
pub fn salary_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "med_salary must be a string or a number, got {other}"
        ))),
    }
}

/// A user record as kept by the document store: the integer key plus an
/// open set of top-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    pub id: i64,
    pub fields: Map<String, Value>,
}

impl UserDocument {
    /// A freshly created profile: credentials plus five empty search slots.
    pub fn new_profile(id: i64, username: &str, password: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(USERNAME_FIELD.to_string(), Value::String(username.to_string()));
        fields.insert(PASSWORD_FIELD.to_string(), Value::String(password.to_string()));
        for slot in RECENT_SEARCH_FIELDS {
            fields.insert(slot.to_string(), Value::Null);
        }
        Self { id, fields }
    }

    /// Returns a string-valued field, or `None` when absent or not a string.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Serializes as the public shape: `id` first, then every stored field.
impl Serialize for UserDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (key, value) in &self.fields {
            if key == "id" {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
