//! Where things live on the rendered leaderboard page.

/// Every player row; the header row has no `td` cells.
pub const ROWS: &str = "#leaderboard tbody tr";
pub const CELLS: &str = "td";
pub const PROFILE_LINK: &str = "td a";
/// League, favourite naut and, when known, country, in that order.
pub const IMAGES: &str = "td img";

pub const RANK_CELL: usize = 0;
pub const NAME_CELL: usize = 1;
pub const WIN_RATE_CELL: usize = 2;
pub const GAMES_SEASON_CELL: usize = 3;
pub const GAMES_TOTAL_CELL: usize = 4;
pub const RATING_CELL: usize = 6;

/// Shown instead of the rows once the search came back empty.
pub const NO_RESULT: &str = "#content-container #no-result:not(.hidden)";
