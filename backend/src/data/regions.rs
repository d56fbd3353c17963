use serde::Serialize;

pub const COUNTRY_JAPAN: &str = "japan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroRegion {
    Hokkaido,
    Tohoku,
    Kanto,
    Chubu,
    Kansai,
    Chugoku,
    Shikoku,
    KyushuOkinawa,
}

impl MacroRegion {
    pub const ALL: [MacroRegion; 8] = [
        MacroRegion::Hokkaido,
        MacroRegion::Tohoku,
        MacroRegion::Kanto,
        MacroRegion::Chubu,
        MacroRegion::Kansai,
        MacroRegion::Chugoku,
        MacroRegion::Shikoku,
        MacroRegion::KyushuOkinawa,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MacroRegion::Hokkaido => "Hokkaido",
            MacroRegion::Tohoku => "Tohoku",
            MacroRegion::Kanto => "Kanto",
            MacroRegion::Chubu => "Chubu",
            MacroRegion::Kansai => "Kansai",
            MacroRegion::Chugoku => "Chugoku",
            MacroRegion::Shikoku => "Shikoku",
            MacroRegion::KyushuOkinawa => "Kyushu & Okinawa",
        }
    }
}

/// A prefecture, with its cell on the tile map
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Region {
    pub id: &'static str,
    pub code: u8,
    pub name: &'static str,
    pub name_ja: &'static str,
    pub macro_region: MacroRegion,
    pub tile_col: u8,
    pub tile_row: u8,
}

const fn region(
    id: &'static str,
    code: u8,
    name: &'static str,
    name_ja: &'static str,
    macro_region: MacroRegion,
    tile_col: u8,
    tile_row: u8,
) -> Region {
    Region {
        id,
        code,
        name,
        name_ja,
        macro_region,
        tile_col,
        tile_row,
    }
}

use MacroRegion::*;

pub static REGIONS: [Region; 47] = [
    region("hokkaido", 1, "Hokkaido", "北海道", Hokkaido, 11, 0),
    region("aomori", 2, "Aomori", "青森県", Tohoku, 10, 1),
    region("iwate", 3, "Iwate", "岩手県", Tohoku, 10, 2),
    region("miyagi", 4, "Miyagi", "宮城県", Tohoku, 10, 3),
    region("akita", 5, "Akita", "秋田県", Tohoku, 9, 2),
    region("yamagata", 6, "Yamagata", "山形県", Tohoku, 9, 3),
    region("fukushima", 7, "Fukushima", "福島県", Tohoku, 9, 4),
    region("ibaraki", 8, "Ibaraki", "茨城県", Kanto, 10, 6),
    region("tochigi", 9, "Tochigi", "栃木県", Kanto, 10, 5),
    region("gunma", 10, "Gunma", "群馬県", Kanto, 9, 5),
    region("saitama", 11, "Saitama", "埼玉県", Kanto, 9, 6),
    region("chiba", 12, "Chiba", "千葉県", Kanto, 10, 7),
    region("tokyo", 13, "Tokyo", "東京都", Kanto, 9, 7),
    region("kanagawa", 14, "Kanagawa", "神奈川県", Kanto, 8, 7),
    region("niigata", 15, "Niigata", "新潟県", Chubu, 8, 4),
    region("toyama", 16, "Toyama", "富山県", Chubu, 7, 4),
    region("ishikawa", 17, "Ishikawa", "石川県", Chubu, 6, 4),
    region("fukui", 18, "Fukui", "福井県", Chubu, 6, 5),
    region("yamanashi", 19, "Yamanashi", "山梨県", Chubu, 8, 6),
    region("nagano", 20, "Nagano", "長野県", Chubu, 8, 5),
    region("gifu", 21, "Gifu", "岐阜県", Chubu, 7, 5),
    region("shizuoka", 22, "Shizuoka", "静岡県", Chubu, 7, 7),
    region("aichi", 23, "Aichi", "愛知県", Chubu, 6, 7),
    region("mie", 24, "Mie", "三重県", Kansai, 5, 8),
    region("shiga", 25, "Shiga", "滋賀県", Kansai, 6, 6),
    region("kyoto", 26, "Kyoto", "京都府", Kansai, 5, 6),
    region("osaka", 27, "Osaka", "大阪府", Kansai, 4, 7),
    region("hyogo", 28, "Hyogo", "兵庫県", Kansai, 4, 6),
    region("nara", 29, "Nara", "奈良県", Kansai, 5, 7),
    region("wakayama", 30, "Wakayama", "和歌山県", Kansai, 4, 8),
    region("tottori", 31, "Tottori", "鳥取県", Chugoku, 3, 6),
    region("shimane", 32, "Shimane", "島根県", Chugoku, 2, 6),
    region("okayama", 33, "Okayama", "岡山県", Chugoku, 3, 7),
    region("hiroshima", 34, "Hiroshima", "広島県", Chugoku, 2, 7),
    region("yamaguchi", 35, "Yamaguchi", "山口県", Chugoku, 1, 7),
    region("tokushima", 36, "Tokushima", "徳島県", Shikoku, 3, 9),
    region("kagawa", 37, "Kagawa", "香川県", Shikoku, 3, 8),
    region("ehime", 38, "Ehime", "愛媛県", Shikoku, 2, 8),
    region("kochi", 39, "Kochi", "高知県", Shikoku, 2, 9),
    region("fukuoka", 40, "Fukuoka", "福岡県", KyushuOkinawa, 0, 7),
    region("saga", 41, "Saga", "佐賀県", KyushuOkinawa, 0, 8),
    region("nagasaki", 42, "Nagasaki", "長崎県", KyushuOkinawa, 0, 9),
    region("kumamoto", 43, "Kumamoto", "熊本県", KyushuOkinawa, 1, 9),
    region("oita", 44, "Oita", "大分県", KyushuOkinawa, 1, 8),
    region("miyazaki", 45, "Miyazaki", "宮崎県", KyushuOkinawa, 1, 10),
    region("kagoshima", 46, "Kagoshima", "鹿児島県", KyushuOkinawa, 0, 10),
    region("okinawa", 47, "Okinawa", "沖縄県", KyushuOkinawa, 0, 12),
];

pub fn all() -> &'static [Region] {
    &REGIONS
}

pub fn find(region_id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == region_id)
}

pub fn count_in(macro_region: MacroRegion) -> usize {
    REGIONS
        .iter()
        .filter(|r| r.macro_region == macro_region)
        .count()
}
