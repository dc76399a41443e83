//! Emoji datasets and the token → cue lookup.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::{SliceRandom, index};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, InsufficientPool};
use crate::tone::Cue;

/// An emoji glyph. Value semantics only: two tokens are the same token iff
/// their glyphs are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub &'static str);

impl Token {
    pub fn glyph(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Animals,
    Magic,
    Hearts,
    Fruits,
}

impl FromStr for Category {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "animals" => Ok(Category::Animals),
            "magic" => Ok(Category::Magic),
            "hearts" => Ok(Category::Hearts),
            "fruits" => Ok(Category::Fruits),
            other => Err(GameError::InvalidConfig(format!("unknown category '{other}'"))),
        }
    }
}

/// Which categories feed a sampling pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Vec<Category>),
}

/// `"all"`, or a comma separated list such as `"animals,fruits"`.
impl FromStr for CategoryFilter {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "all" {
            return Ok(CategoryFilter::All);
        }
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Category>, _>>()
            .map(CategoryFilter::Only)
    }
}

impl CategoryFilter {
    pub fn admits(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(list) => list.contains(&category),
        }
    }
}

/// Static description of one category.
#[derive(Clone, Copy, Debug)]
pub struct CategoryDef {
    pub category: Category,
    pub tokens: &'static [Token],
    /// Per-token cue overrides, checked first.
    pub overrides: &'static [(Token, Cue)],
    /// Cue for every token without an override.
    pub cue: Option<Cue>,
}

// -----------------------------------------------------------------------------
// Built-in datasets
// -----------------------------------------------------------------------------

pub const ANIMALS: &[Token] = &[
    Token("🐶"), Token("🐱"), Token("🐭"), Token("🐹"), Token("🐰"), Token("🦊"), Token("🐻"), Token("🐼"),
    Token("🐨"), Token("🐯"), Token("🦁"), Token("🐮"), Token("🐷"), Token("🐸"), Token("🐵"), Token("🐔"),
    Token("🦆"), Token("🦉"), Token("🐝"), Token("🦋"), Token("🐞"), Token("🐠"), Token("🐡"), Token("🐙"),
    Token("🐧"), Token("🐦"), Token("🐤"), Token("🐣"), Token("🐺"), Token("🐴"), Token("🦄"),
];

pub const ANIMAL_CUES: &[(Token, Cue)] = &[
    (Token("🐶"), Cue::Bark), (Token("🐱"), Cue::Meow), (Token("🐭"), Cue::Squeak), (Token("🐹"), Cue::Squeak),
    (Token("🐰"), Cue::Hop), (Token("🦊"), Cue::Bark), (Token("🐻"), Cue::Growl), (Token("🐼"), Cue::Growl),
    (Token("🐨"), Cue::Grunt), (Token("🐯"), Cue::Roar), (Token("🦁"), Cue::Roar), (Token("🐮"), Cue::Moo),
    (Token("🐷"), Cue::Oink), (Token("🐸"), Cue::Ribbit), (Token("🐵"), Cue::Monkey), (Token("🐔"), Cue::Cluck),
    (Token("🦆"), Cue::Quack), (Token("🦉"), Cue::Hoot), (Token("🐝"), Cue::Buzz), (Token("🦋"), Cue::Flutter),
    (Token("🐞"), Cue::Buzz), (Token("🐠"), Cue::Bubble), (Token("🐡"), Cue::Bubble), (Token("🐙"), Cue::Bubble),
    (Token("🐧"), Cue::Squeak), (Token("🐦"), Cue::Flutter), (Token("🐤"), Cue::Cluck), (Token("🐣"), Cue::Cluck),
    (Token("🐺"), Cue::Growl), (Token("🐴"), Cue::Grunt), (Token("🦄"), Cue::Sparkle),
];

pub const MAGIC: &[Token] = &[
    Token("⭐"), Token("🌟"), Token("✨"), Token("💫"), Token("🌈"), Token("☀️"), Token("🌙"), Token("⚡"),
    Token("🌠"), Token("🔮"),
];

pub const HEARTS: &[Token] = &[
    Token("❤️"), Token("💛"), Token("💚"), Token("💙"), Token("💜"), Token("🧡"), Token("🎈"), Token("🎁"),
    Token("🖤"), Token("🤍"),
];

pub const FRUITS: &[Token] = &[
    Token("🍎"), Token("🍊"), Token("🍋"), Token("🍌"), Token("🍉"), Token("🍇"), Token("🍓"), Token("🍒"),
];

pub const STANDARD_CATEGORIES: [CategoryDef; 4] = [
    CategoryDef { category: Category::Animals, tokens: ANIMALS, overrides: ANIMAL_CUES, cue: None },
    CategoryDef { category: Category::Magic, tokens: MAGIC, overrides: &[], cue: Some(Cue::Sparkle) },
    CategoryDef { category: Category::Hearts, tokens: HEARTS, overrides: &[], cue: Some(Cue::Love) },
    CategoryDef { category: Category::Fruits, tokens: FRUITS, overrides: &[], cue: Some(Cue::Pop) },
];

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

pub struct Catalog {
    categories: Vec<Category>,
    by_category: HashMap<Category, Vec<Token>>,
    all: Vec<Token>,
    cues: HashMap<Token, Cue>,
}

impl Catalog {
    /// Builds a catalog and precomputes the cue of every token. A token listed
    /// under several categories stays in the first one only.
    pub fn new(defs: &[CategoryDef]) -> Self {
        let mut categories = Vec::with_capacity(defs.len());
        let mut by_category: HashMap<Category, Vec<Token>> = HashMap::new();
        let mut all = Vec::new();
        let mut cues = HashMap::new();

        for def in defs {
            if !categories.contains(&def.category) {
                categories.push(def.category);
            }
            let overrides: HashMap<Token, Cue> = def.overrides.iter().copied().collect();
            let bucket = by_category.entry(def.category).or_default();
            for &token in def.tokens {
                if cues.contains_key(&token) {
                    log::warn!("token {token} listed twice, keeping first category");
                    continue;
                }
                let cue = overrides.get(&token).copied().or(def.cue).unwrap_or(Cue::Default);
                cues.insert(token, cue);
                bucket.push(token);
                all.push(token);
            }
        }

        Self { categories, by_category, all, cues }
    }

    pub fn standard() -> Self {
        Self::new(&STANDARD_CATEGORIES)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tokens_in(&self, category: Category) -> &[Token] {
        self.by_category.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every token, category order then list order.
    pub fn all_tokens(&self) -> &[Token] {
        &self.all
    }

    pub fn cue_for(&self, token: Token) -> Cue {
        self.cues.get(&token).copied().unwrap_or(Cue::Default)
    }

    pub fn pool(&self, filter: &CategoryFilter) -> Vec<Token> {
        self.categories
            .iter()
            .filter(|c| filter.admits(**c))
            .flat_map(|c| self.tokens_in(*c).iter().copied())
            .collect()
    }
}

pub fn random_token<R: Rng + ?Sized>(pool: &[Token], rng: &mut R) -> Result<Token, InsufficientPool> {
    pool.choose(rng)
        .copied()
        .ok_or(InsufficientPool { requested: 1, available: 0 })
}

/// Draws `n` pairwise-distinct tokens from `pool`, skipping `excluding`.
pub fn random_distinct<R: Rng + ?Sized>(
    pool: &[Token],
    n: usize,
    excluding: &[Token],
    rng: &mut R,
) -> Result<Vec<Token>, InsufficientPool> {
    let mut seen = HashSet::with_capacity(pool.len());
    let candidates: Vec<Token> = pool
        .iter()
        .copied()
        .filter(|t| !excluding.contains(t) && seen.insert(*t))
        .collect();
    if n > candidates.len() {
        return Err(InsufficientPool { requested: n, available: candidates.len() });
    }
    Ok(index::sample(rng, candidates.len(), n)
        .into_iter()
        .map(|i| candidates[i])
        .collect())
}
