use crate::url_builder::ServiceFamily;

/// Static description of one callable remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointDescriptor {
    id: &'static str,
    template: &'static str,
}

impl EndpointDescriptor {
    pub const fn new(id: &'static str, template: &'static str) -> Self {
        Self { id, template }
    }

    /// Stable identifier, e.g. `traffic.trafficFlowById`.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Path template relative to the base host, with `{name}` placeholders.
    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn service_family(&self) -> Option<ServiceFamily> {
        ServiceFamily::detect(self.template)
    }

    /// Placeholder names in template order, without duplicates.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.template;
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + len];
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
            rest = &rest[open + len + 1..];
        }
        names
    }
}
