/// Case-insensitive substring filter over a record's text fields.
///
/// Fields are concatenated without a separator before matching, so a query
/// may span the end of one field and the start of the next.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Query(String);

impl Query {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches<'a>(
        &self,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        if self.is_empty() {
            return true;
        }
        fields
            .into_iter()
            .collect::<String>()
            .to_lowercase()
            .contains(&self.0)
    }
}
