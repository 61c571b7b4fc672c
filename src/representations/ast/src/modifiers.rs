#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_sealed: bool,
    pub is_abstract: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        is_static: false,
        is_virtual: false,
        is_override: false,
        is_sealed: false,
        is_abstract: false,
    };

    pub fn new() -> Self {
        Self::NONE
    }

    pub fn r#static(self) -> Self {
        Self {
            is_static: true,
            ..self
        }
    }

    pub fn r#virtual(self) -> Self {
        Self {
            is_virtual: true,
            ..self
        }
    }

    pub fn r#override(self) -> Self {
        Self {
            is_override: true,
            ..self
        }
    }

    pub fn sealed(self) -> Self {
        Self {
            is_sealed: true,
            ..self
        }
    }

    pub fn r#abstract(self) -> Self {
        Self {
            is_abstract: true,
            ..self
        }
    }

    /// Whether a derived type may override this member
    pub fn is_overridable(&self) -> bool {
        (self.is_virtual || self.is_abstract || self.is_override) && !self.is_sealed
    }

    /// Whether this member takes part in virtual dispatch at all
    pub fn is_dispatched(&self) -> bool {
        self.is_virtual || self.is_abstract || self.is_override
    }
}
