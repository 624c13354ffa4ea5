//! Per-level monster reference values used for the config defaults that
//! follow the character level.

pub const MAX_MONSTER_LEVEL: u32 = 100;

/// Base damage of a monster hit, indexed by `level - 1`.
#[rustfmt::skip]
pub const MONSTER_DAMAGE_TABLE: [f64; MAX_MONSTER_LEVEL as usize] = [
       4.99,    5.71,    6.46,    7.27,    8.11,    9.01,    9.95,   10.95,    12.0,   13.11,
      14.28,   15.52,   16.82,   18.19,   19.63,   21.15,   22.74,   24.41,   26.17,   28.01,
      29.95,   31.98,    34.1,   36.33,   38.67,   41.12,   43.68,   46.37,   49.18,   52.12,
       55.2,   58.42,   61.79,   65.31,   68.99,   72.84,   76.86,   81.07,   85.45,   90.04,
      94.83,   99.83,  105.05,   110.5,  116.19,  122.13,  128.32,  134.78,  141.52,  148.54,
     155.86,  163.48,  171.43,   179.7,  188.32,   197.3,  206.65,  216.38,  226.51,  237.05,
     248.02,  259.43,  271.31,  283.66,  296.51,  309.87,  323.77,  338.21,  353.23,  368.84,
     385.07,  401.93,  419.46,  437.67,   456.6,  476.26,  496.69,  517.91,  539.96,  562.85,
     586.64,  611.34,  636.99,  663.62,  691.27,  719.98,  749.79,  780.73,  812.84,  846.17,
     880.77,  916.67,  953.93,   992.6, 1032.72, 1074.36, 1117.56, 1162.39, 1208.89, 1257.15,
];

/// Base life of a normal monster, indexed by `level - 1`.
#[rustfmt::skip]
pub const MONSTER_LIFE_TABLE: [u32; MAX_MONSTER_LEVEL as usize] = [
      15,   17,   20,   23,   26,   30,   33,   37,   41,   46,
      50,   55,   60,   66,   71,   77,   84,   91,   98,  105,
     113,  122,  131,  140,  150,  161,  171,  183,  195,  208,
     222,  236,  251,  266,  283,  300,  318,  337,  357,  379,
     401,  424,  448,  474,  501,  529,  559,  590,  622,  656,
     692,  730,  769,  810,  853,  899,  946,  996, 1048, 1102,
    1159, 1219, 1281, 1346, 1415, 1486, 1561, 1640, 1722, 1807,
    1897, 1991, 2089, 2192, 2299, 2411, 2528, 2651, 2779, 2913,
    3053, 3199, 3352, 3511, 3678, 3853, 4035, 4225, 4424, 4631,
    4848, 5074, 5310, 5557, 5815, 6084, 6364, 6658, 6964, 7283,
];

fn index(level: i64) -> usize {
    (level.clamp(1, i64::from(MAX_MONSTER_LEVEL)) - 1) as usize
}

/// Monster hit damage for `level`, clamped into the table.
pub fn damage(level: i64) -> f64 {
    MONSTER_DAMAGE_TABLE[index(level)]
}

pub fn life(level: i64) -> u32 {
    MONSTER_LIFE_TABLE[index(level)]
}
