use derive_more::IsVariant;
use std::fmt::Display;

// NOTE: Privacy is ordered from least private to most private
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, IsVariant)]
pub enum Privacy {
    Public,
    Protected,
    #[default]
    Private,
}

impl Privacy {
    /// The more restrictive of two privacies, as when an accessor narrows
    /// the privacy of its property
    pub fn most_restrictive(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn is_at_least_as_visible_as(self, other: Self) -> bool {
        self <= other
    }
}

impl Display for Privacy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Privacy::Public => write!(f, "public"),
            Privacy::Protected => write!(f, "protected"),
            Privacy::Private => write!(f, "private"),
        }
    }
}

#[test]
fn test_privacy_ordering() {
    assert!(Privacy::Public.is_at_least_as_visible_as(Privacy::Protected));
    assert!(!Privacy::Private.is_at_least_as_visible_as(Privacy::Protected));
    assert_eq!(
        Privacy::Public.most_restrictive(Privacy::Private),
        Privacy::Private
    );
}
