// =============================================================================
// RAM Addresses — Super Mario Bros. (NES), 2 KiB work RAM
// =============================================================================

pub const PAGE_SIZE: usize = 256;
pub const NUM_BLOCKS: usize = 8;
pub const RAM_SIZE: usize = NUM_BLOCKS * PAGE_SIZE;

pub const MAX_ENEMIES: usize = 5;

// Enemy slots (5 active)
pub const ENEMY_DRAWN: [u16; MAX_ENEMIES] = [0x000F, 0x0010, 0x0011, 0x0012, 0x0013];
pub const ENEMY_TYPE: [u16; MAX_ENEMIES] = [0x0016, 0x0017, 0x0018, 0x0019, 0x001A];
pub const ENEMY_X_PAGE: [u16; MAX_ENEMIES] = [0x006E, 0x006F, 0x0070, 0x0071, 0x0072];
pub const ENEMY_X_SCREEN: [u16; MAX_ENEMIES] = [0x0087, 0x0088, 0x0089, 0x008A, 0x008B];
pub const ENEMY_Y_SCREEN: [u16; MAX_ENEMIES] = [0x00CF, 0x00D0, 0x00D1, 0x00D2, 0x00D3];
pub const ENEMY_X_SCREEN_OFFSET: u16 = 0x03AE;

pub const PLAYER_STATE: u16 = 0x001D;
pub const PLAYER_X_PAGE: u16 = 0x006D;
pub const PLAYER_X_SCREEN: u16 = 0x0086;
pub const PLAYER_VERTICAL_SCREEN: u16 = 0x00B5;
pub const PLAYER_Y_ON_SCREEN: u16 = 0x00CE;
pub const PLAYER_X_SCREEN_OFFSET: u16 = 0x03AD;
pub const PLAYER_Y_SCREEN_OFFSET: u16 = 0x03B8;

// Score: 6 decimal digits, most significant at the lowest address
pub const SCORE_DIGITS: [u16; 6] = [0x07D7, 0x07D8, 0x07D9, 0x07DA, 0x07DB, 0x07DC];

// Tile map: two screen pages of 13 rows x 16 columns
pub const TILE_BASE: u16 = 0x0500;
pub const TILE_ROWS: usize = 13;
pub const TILE_COLS: usize = 16;
pub const TILE_PAGE_SIZE: usize = TILE_ROWS * TILE_COLS;
pub const NUM_SCREEN_PAGES: usize = 2;
pub const TILE_REGION_END: usize = TILE_BASE as usize + NUM_SCREEN_PAGES * TILE_PAGE_SIZE;

const fn all_in_ram(addrs: &[u16]) -> bool {
    let mut i = 0;
    while i < addrs.len() {
        if addrs[i] as usize >= RAM_SIZE {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = {
    assert!(all_in_ram(&ENEMY_DRAWN));
    assert!(all_in_ram(&ENEMY_TYPE));
    assert!(all_in_ram(&ENEMY_X_PAGE));
    assert!(all_in_ram(&ENEMY_X_SCREEN));
    assert!(all_in_ram(&ENEMY_Y_SCREEN));
    assert!(all_in_ram(&SCORE_DIGITS));
    assert!(all_in_ram(&[
        ENEMY_X_SCREEN_OFFSET,
        PLAYER_STATE,
        PLAYER_X_PAGE,
        PLAYER_X_SCREEN,
        PLAYER_VERTICAL_SCREEN,
        PLAYER_Y_ON_SCREEN,
        PLAYER_X_SCREEN_OFFSET,
        PLAYER_Y_SCREEN_OFFSET,
    ]));
    assert!(TILE_REGION_END <= RAM_SIZE);
};
