/// Annotation name that excludes a member from encode and decode.
pub const IGNORED: &str = "-";

/// External name and role of one record member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescriptor {
    pub name: String,
    pub is_tag: bool,
    pub is_field: bool,
}

impl TagDescriptor {
    /// Resolve `annotation` (`name[,role...]`) for the member declared as `member`.
    ///
    /// An empty first segment keeps the declared name. Roles other than
    /// `tag` and `field` are ignored; a member with neither is a field.
    pub fn resolve(member: &str, annotation: &str) -> Self {
        let mut parts = annotation.split(',');
        let name = match parts.next() {
            Some(first) if !first.is_empty() => first,
            _ => member,
        };

        let mut is_tag = false;
        let mut is_field = false;
        for part in parts {
            match part {
                "tag" => is_tag = true,
                "field" => is_field = true,
                _ => {}
            }
        }
        if !is_tag && !is_field {
            is_field = true;
        }

        Self {
            name: name.to_string(),
            is_tag,
            is_field,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.name == IGNORED
    }
}
