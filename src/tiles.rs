use serde::Serialize;

// =============================================================================
// Tile & Enemy Catalogs
// =============================================================================

/// Declares a closed byte catalog. The last listed variant is the fallback
/// returned by `classify` for bytes the catalog does not name.
macro_rules! catalog {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $byte:literal,)+
        }
        fallback = $fallback:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $byte,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];
            pub const FALLBACK: $name = $name::$fallback;

            pub fn recognize(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn classify(byte: u8) -> Self {
                Self::recognize(byte).unwrap_or(Self::FALLBACK)
            }

            pub fn byte(self) -> u8 {
                self as u8
            }
        }
    };
}

catalog! {
    /// Terrain bytes found in the tile map.
    pub enum StaticTile {
        Empty = 0x00,
        Fake = 0x01,
        TopPipe1 = 0x12,
        TopPipe2 = 0x13,
        BottomPipe1 = 0x14,
        BottomPipe2 = 0x15,
        FlagpoleTop = 0x24,
        Flagpole = 0x25,
        BreakableBlock = 0x51,
        Ground = 0x54,
        CoinBlock1 = 0xC0,
        CoinBlock2 = 0xC1,
        Coin = 0xC2,
        Generic = 0xFF,
    }
    fallback = Generic;
}

catalog! {
    /// Moving objects and markers overlaid on the terrain.
    pub enum DynamicTile {
        StaticLift1 = 0x24,
        StaticLift2 = 0x25,
        VerticalLift1 = 0x26,
        VerticalLift2 = 0x27,
        HorizontalLift = 0x28,
        FallingStaticLift = 0x29,
        HorizontalMovingLift = 0x2A,
        Lift1 = 0x2B,
        Lift2 = 0x2C,
        Vine = 0x2F,
        Flagpole = 0x30,
        StartFlag = 0x31,
        JumpSpring = 0x32,
        Warpzone = 0x34,
        Spring1 = 0x67,
        Spring2 = 0x68,
        Mario = 0xAA,
        Generic = 0xFF,
    }
    fallback = Generic;
}

catalog! {
    /// Enemy identities as stored in the enemy type slots.
    pub enum EnemyKind {
        GreenKoopa1 = 0x00,
        RedKoopa1 = 0x01,
        BuzzyBeetle = 0x02,
        RedKoopa2 = 0x03,
        GreenKoopa2 = 0x04,
        HammerBrother = 0x05,
        Goomba = 0x06,
        Blooper = 0x07,
        BulletBill = 0x08,
        GreenKoopaParatroopa = 0x09,
        GreyCheepCheep = 0x0A,
        RedCheepCheep = 0x0B,
        Podoboo = 0x0C,
        PiranhaPlant = 0x0D,
        GreenParatroopaJump = 0x0E,
        BowserFlame1 = 0x10,
        Lakitu = 0x11,
        SpinyEgg = 0x12,
        FlyCheepCheep = 0x14,
        BowserFlame2 = 0x15,
        Generic = 0xFF,
    }
    fallback = Generic;
}

/// One cell of the decoded world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "layer", content = "kind", rename_all = "snake_case")]
pub enum TileType {
    Static(StaticTile),
    Dynamic(DynamicTile),
    Enemy(EnemyKind),
}

impl TileType {
    pub const EMPTY: TileType = TileType::Static(StaticTile::Empty);
    pub const FAKE: TileType = TileType::Static(StaticTile::Fake);
    pub const ENEMY: TileType = TileType::Enemy(EnemyKind::Generic);
    pub const PLAYER: TileType = TileType::Dynamic(DynamicTile::Mario);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl Default for TileType {
    fn default() -> Self {
        Self::EMPTY
    }
}
