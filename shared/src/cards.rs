//! Card-related types for the KAD-Kings table.

use serde::{Deserialize, Serialize};

/// Number of cards in a full deck.
pub const DECK_SIZE: u8 = 52;

/// Card rank values (0=Ace, 1=2, ..., 12=King)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRank {
    Ace = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
    Nine = 8,
    Ten = 9,
    Jack = 10,
    Queen = 11,
    King = 12,
}

impl CardRank {
    /// Convert from u8 to CardRank. Returns `None` if value > 12.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => CardRank::Ace,
            1 => CardRank::Two,
            2 => CardRank::Three,
            3 => CardRank::Four,
            4 => CardRank::Five,
            5 => CardRank::Six,
            6 => CardRank::Seven,
            7 => CardRank::Eight,
            8 => CardRank::Nine,
            9 => CardRank::Ten,
            10 => CardRank::Jack,
            11 => CardRank::Queen,
            12 => CardRank::King,
            _ => return None,
        })
    }

    /// Full English name, used by log lines and the terminal renderer.
    pub fn name(self) -> &'static str {
        match self {
            CardRank::Ace => "Ace",
            CardRank::Two => "Two",
            CardRank::Three => "Three",
            CardRank::Four => "Four",
            CardRank::Five => "Five",
            CardRank::Six => "Six",
            CardRank::Seven => "Seven",
            CardRank::Eight => "Eight",
            CardRank::Nine => "Nine",
            CardRank::Ten => "Ten",
            CardRank::Jack => "Jack",
            CardRank::Queen => "Queen",
            CardRank::King => "King",
        }
    }
}

/// Card suit values (0=Clubs, 1=Diamonds, 2=Hearts, 3=Spades)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardSuit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

impl CardSuit {
    /// Convert from u8 to CardSuit. Returns `None` if value > 3.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => CardSuit::Clubs,
            1 => CardSuit::Diamonds,
            2 => CardSuit::Hearts,
            3 => CardSuit::Spades,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            CardSuit::Clubs => "Clubs",
            CardSuit::Diamonds => "Diamonds",
            CardSuit::Hearts => "Hearts",
            CardSuit::Spades => "Spades",
        }
    }
}

/// A playing card represented as a compact u8 value (`suit * 13 + rank`).
///
/// Deserialization rejects values outside `0..52`, so every `Card` in a
/// decoded snapshot has a valid rank and suit.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    /// Create a new card from rank and suit
    pub fn new(rank: CardRank, suit: CardSuit) -> Self {
        Card((suit as u8) * 13 + (rank as u8))
    }

    /// All 52 cards in suit-major order.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE).map(Card)
    }

    /// Compact index of this card (0..52).
    pub fn index(self) -> u8 {
        self.0
    }

    /// Get the rank of this card
    pub fn rank(self) -> CardRank {
        match CardRank::from_u8(self.0 % 13) {
            Some(rank) => rank,
            None => unreachable!("x % 13 is always a valid rank"),
        }
    }

    /// Get the suit of this card
    pub fn suit(self) -> CardSuit {
        match CardSuit::from_u8(self.0 / 13) {
            Some(suit) => suit,
            None => unreachable!("card index is validated on construction"),
        }
    }

    /// Get the rank as a string (A, 2, 3, ..., K)
    pub fn rank_str(self) -> &'static str {
        match self.rank() {
            CardRank::Ace => "A",
            CardRank::Two => "2",
            CardRank::Three => "3",
            CardRank::Four => "4",
            CardRank::Five => "5",
            CardRank::Six => "6",
            CardRank::Seven => "7",
            CardRank::Eight => "8",
            CardRank::Nine => "9",
            CardRank::Ten => "T",
            CardRank::Jack => "J",
            CardRank::Queen => "Q",
            CardRank::King => "K",
        }
    }

    /// Get the suit as a character (♣, ♦, ♥, ♠)
    pub fn suit_char(self) -> char {
        match self.suit() {
            CardSuit::Clubs => '♣',
            CardSuit::Diamonds => '♦',
            CardSuit::Hearts => '♥',
            CardSuit::Spades => '♠',
        }
    }

    /// Check if this is a red suit (hearts or diamonds)
    pub fn is_red(self) -> bool {
        matches!(self.suit(), CardSuit::Hearts | CardSuit::Diamonds)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank_str(), self.suit_char())
    }
}

/// Error returned when a wire value does not name one of the 52 cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("card index {0} is out of range (expected 0..52)")]
pub struct InvalidCard(pub u8);

impl TryFrom<u8> for Card {
    type Error = InvalidCard;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < DECK_SIZE {
            Ok(Card(value))
        } else {
            Err(InvalidCard(value))
        }
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.0
    }
}
