use derive_new::new;

/// A metabolite identity. Participation (which reactions touch it, and
/// with what signed stoichiometry) is derived from the reaction set, not
/// stored here — the model view is the single source of truth for
/// stoichiometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct Metabolite {
    #[new(into)]
    pub id: String,
    #[new(default)]
    pub name: Option<String>,
    #[new(default)]
    pub compartment: Option<String>,
}

impl Metabolite {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_compartment(mut self, compartment: impl Into<String>) -> Self {
        self.compartment = Some(compartment.into());
        self
    }

    /// The token used in rendered equations: the display name when
    /// `use_names` is set and a name is present, the ID otherwise, with
    /// an optional compartment suffix controlled by `add_suffixes`.
    pub fn display_token(&self, use_names: bool, add_suffixes: bool) -> String {
        let base = if use_names {
            self.name.as_deref().unwrap_or(&self.id)
        } else {
            &self.id
        };
        match (add_suffixes, &self.compartment) {
            (true, Some(c)) => format!("{base}[{c}]"),
            _ => base.to_string(),
        }
    }
}
