use serde::{Deserialize, Serialize};

/// Commentary voice requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Cynic,
    Theory,
    Coach,
    Optimist,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::Cynic,
        Persona::Theory,
        Persona::Coach,
        Persona::Optimist,
    ];

    /// Key used in the generator's JSON response.
    pub fn key(&self) -> &'static str {
        match self {
            Persona::Cynic => "cynic",
            Persona::Theory => "theory",
            Persona::Coach => "coach",
            Persona::Optimist => "optimist",
        }
    }

    /// Character instruction injected into the prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            Persona::Cynic => {
                "An extremely sarcastic cynic who hates early mornings, people, \
                 and every kind of weather. Harsh tone, dark humor, witty jabs \
                 at the world."
            }
            Persona::Theory => {
                "A paranoid conspiracy theorist. The weather is a weapon steered \
                 through HAARP, clouds are mind-control chemtrails, and the \
                 forecast is government propaganda."
            }
            Persona::Coach => {
                "An aggressive, overmotivated fitness coach. There is no bad \
                 weather, only personal weakness. Shouts at the user, stacks \
                 motivational cliches, accepts no excuses."
            }
            Persona::Optimist => {
                "An insufferably positive soul. Every weather is a gift: rain \
                 means nature is drinking, snow turns the world into a fairy \
                 tale, frost builds character. Enthusiastic and full of joy."
            }
        }
    }
}

/// Which personas one generation request should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaScope {
    /// All four personas in a single response object.
    All,
    /// A single persona (e.g. after a manual persona switch).
    Single(Persona),
}

impl PersonaScope {
    pub fn personas(&self) -> Vec<Persona> {
        match self {
            PersonaScope::All => Persona::ALL.to_vec(),
            PersonaScope::Single(p) => vec![*p],
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_keys_are_stable() {
        assert_eq!(Persona::Cynic.key(), "cynic");
        assert_eq!(Persona::Theory.key(), "theory");
        assert_eq!(Persona::Coach.key(), "coach");
        assert_eq!(Persona::Optimist.key(), "optimist");
    }

    #[test]
    fn test_scope_expansion() {
        assert_eq!(PersonaScope::All.personas().len(), 4);
        assert_eq!(
            PersonaScope::Single(Persona::Coach).personas(),
            vec![Persona::Coach]
        );
    }
}
