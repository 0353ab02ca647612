use serde::Deserialize;

/// Body for creating or replacing a prompt entry.
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub title: String,
    #[serde(alias = "prompt")]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerFilter {
    pub owner_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_field_is_accepted_for_body() {
        let req: PromptRequest =
            serde_json::from_str(r#"{"title":"Request","prompt":"Need certificate"}"#).unwrap();
        assert_eq!(req.body, "Need certificate");
    }
}
