/// One of the four wind tiles, in fixed ring order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Wind {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl From<u8> for Wind {
    fn from(n: u8) -> Wind {
        match n {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            3 => Wind::North,
            _ => panic!("invalid wind"),
        }
    }
}
impl From<Wind> for u8 {
    fn from(w: Wind) -> u8 {
        w as u8
    }
}

impl std::fmt::Display for Wind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Wind::East => "E",
                Wind::South => "S",
                Wind::West => "W",
                Wind::North => "N",
            }
        )
    }
}

/// One of the three dragon tiles.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dragon {
    Red = 0,
    Green = 1,
    White = 2,
}

impl From<u8> for Dragon {
    fn from(n: u8) -> Dragon {
        match n {
            0 => Dragon::Red,
            1 => Dragon::Green,
            2 => Dragon::White,
            _ => panic!("invalid dragon"),
        }
    }
}
impl From<Dragon> for u8 {
    fn from(d: Dragon) -> u8 {
        d as u8
    }
}

impl std::fmt::Display for Dragon {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Dragon::Red => "R",
                Dragon::Green => "G",
                Dragon::White => "W",
            }
        )
    }
}

/// A single tile.
///
/// Suited tiles carry a rank 1-9, flowers a bonus index 1-8. Flowers are
/// never held in a playable hand; drawing one enters the flower-exchange
/// sub-phase.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tile {
    Character(u8),
    Dot(u8),
    Bamboo(u8),
    Wind(Wind),
    Dragon(Dragon),
    Flower(u8),
}

impl Tile {
    /// True if this tile can sit in a playable hand.
    pub fn is_playable(&self) -> bool {
        !self.is_flower()
    }
    /// True if this is a bonus flower tile.
    pub fn is_flower(&self) -> bool {
        matches!(self, Tile::Flower(_))
    }
    /// True if this is a numbered suit tile.
    pub fn is_suited(&self) -> bool {
        matches!(self, Tile::Character(_) | Tile::Dot(_) | Tile::Bamboo(_))
    }
    /// True if this is a wind or dragon.
    pub fn is_honor(&self) -> bool {
        matches!(self, Tile::Wind(_) | Tile::Dragon(_))
    }
    /// Rank of a suited tile.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Tile::Character(n) | Tile::Dot(n) | Tile::Bamboo(n) => Some(*n),
            _ => None,
        }
    }
}

/// u8 isomorphism
/// tiles are mapped to their location in the sorted set of 42 distinct kinds:
/// characters 0-8, dots 9-17, bamboo 18-26, winds 27-30, dragons 31-33,
/// flowers 34-41
impl From<Tile> for u8 {
    fn from(t: Tile) -> u8 {
        match t {
            Tile::Character(n) => n - 1,
            Tile::Dot(n) => 9 + n - 1,
            Tile::Bamboo(n) => 18 + n - 1,
            Tile::Wind(w) => 27 + u8::from(w),
            Tile::Dragon(d) => 31 + u8::from(d),
            Tile::Flower(n) => 34 + n - 1,
        }
    }
}
impl From<u8> for Tile {
    fn from(n: u8) -> Self {
        match n {
            0..=8 => Tile::Character(n + 1),
            9..=17 => Tile::Dot(n - 9 + 1),
            18..=26 => Tile::Bamboo(n - 18 + 1),
            27..=30 => Tile::Wind(Wind::from(n - 27)),
            31..=33 => Tile::Dragon(Dragon::from(n - 31)),
            34..=41 => Tile::Flower(n - 34 + 1),
            _ => panic!("invalid tile"),
        }
    }
}

impl TryFrom<&str> for Tile {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let rank = |c: Option<char>, max: u8| {
            c.and_then(|c| c.to_digit(10))
                .map(|n| n as u8)
                .filter(|n| (1..=max).contains(n))
                .ok_or_else(|| anyhow::anyhow!("invalid tile rank in {}", s))
        };
        let mut chars = s.chars();
        match chars.next() {
            Some('M') => Ok(Tile::Character(rank(chars.next(), 9)?)),
            Some('P') => Ok(Tile::Dot(rank(chars.next(), 9)?)),
            Some('S') => Ok(Tile::Bamboo(rank(chars.next(), 9)?)),
            Some('F') => Ok(Tile::Flower(rank(chars.next(), 8)?)),
            Some('W') => match chars.next() {
                Some('E') => Ok(Tile::Wind(Wind::East)),
                Some('S') => Ok(Tile::Wind(Wind::South)),
                Some('W') => Ok(Tile::Wind(Wind::West)),
                Some('N') => Ok(Tile::Wind(Wind::North)),
                _ => Err(anyhow::anyhow!("invalid wind tile {}", s)),
            },
            Some('D') => match chars.next() {
                Some('R') => Ok(Tile::Dragon(Dragon::Red)),
                Some('G') => Ok(Tile::Dragon(Dragon::Green)),
                Some('W') => Ok(Tile::Dragon(Dragon::White)),
                _ => Err(anyhow::anyhow!("invalid dragon tile {}", s)),
            },
            _ => Err(anyhow::anyhow!("invalid tile {}", s)),
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Tile::Character(n) => write!(f, "M{}", n),
            Tile::Dot(n) => write!(f, "P{}", n),
            Tile::Bamboo(n) => write!(f, "S{}", n),
            Tile::Wind(w) => write!(f, "W{}", w),
            Tile::Dragon(d) => write!(f, "D{}", d),
            Tile::Flower(n) => write!(f, "F{}", n),
        }
    }
}

/// Tiles cross the wire in their string form.
impl serde::Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
impl<'de> serde::Deserialize<'de> for Tile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tile::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

impl mjs_core::Arbitrary for Tile {
    fn random() -> Self {
        Tile::from(rand::random_range(0..42u8))
    }
}
