use derive_more::IsVariant;
use std::fmt::Display;

/// Sub-declaration an attribute on a positional parameter is routed to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IsVariant)]
pub enum AttributeTarget {
    Field,
    Property,
    Param,
    Method,
}

impl AttributeTarget {
    pub const ALL: [AttributeTarget; 4] = [
        AttributeTarget::Field,
        AttributeTarget::Property,
        AttributeTarget::Param,
        AttributeTarget::Method,
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "field" => Some(Self::Field),
            "property" => Some(Self::Property),
            "param" => Some(Self::Param),
            "method" => Some(Self::Method),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            AttributeTarget::Field => "field",
            AttributeTarget::Property => "property",
            AttributeTarget::Param => "param",
            AttributeTarget::Method => "method",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            AttributeTarget::Field => 1 << 0,
            AttributeTarget::Property => 1 << 1,
            AttributeTarget::Param => 1 << 2,
            AttributeTarget::Method => 1 << 3,
        }
    }
}

impl Display for AttributeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TargetSet(u8);

impl TargetSet {
    pub const EMPTY: TargetSet = TargetSet(0);

    pub const ALL: TargetSet = TargetSet(
        AttributeTarget::Field.bit()
            | AttributeTarget::Property.bit()
            | AttributeTarget::Param.bit()
            | AttributeTarget::Method.bit(),
    );

    /// Where an annotation without a routing keyword lands
    pub const UNPREFIXED: TargetSet = TargetSet(
        AttributeTarget::Field.bit() | AttributeTarget::Property.bit() | AttributeTarget::Param.bit(),
    );

    pub fn only(target: AttributeTarget) -> Self {
        Self(target.bit())
    }

    pub fn contains(&self, target: AttributeTarget) -> bool {
        self.0 & target.bit() != 0
    }

    pub fn with(self, target: AttributeTarget) -> Self {
        Self(self.0 | target.bit())
    }

    pub fn without(self, target: AttributeTarget) -> Self {
        Self(self.0 & !target.bit())
    }

    pub fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = AttributeTarget> + '_ {
        AttributeTarget::ALL
            .into_iter()
            .filter(|target| self.contains(*target))
    }
}

impl FromIterator<AttributeTarget> for TargetSet {
    fn from_iter<T: IntoIterator<Item = AttributeTarget>>(iter: T) -> Self {
        iter.into_iter()
            .fold(TargetSet::EMPTY, |set, target| set.with(target))
    }
}

#[test]
fn test_unprefixed_excludes_method() {
    let targets = TargetSet::UNPREFIXED.iter().collect::<Vec<_>>();

    assert_eq!(
        targets,
        vec![
            AttributeTarget::Field,
            AttributeTarget::Property,
            AttributeTarget::Param
        ]
    );
    assert!(!TargetSet::UNPREFIXED.contains(AttributeTarget::Method));
}
