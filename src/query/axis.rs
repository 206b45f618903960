//! X-axis tick spacing for a year range.

/// Upper bound (inclusive) of the range length, and the step used up to it.
/// Keeps roughly 7 to 13 labelled ticks.
const STEP_TABLE: [(i32, i32); 8] = [
    (29, 3),
    (59, 5),
    (104, 10),
    (139, 15),
    (174, 20),
    (323, 25),
    (388, 30),
    (453, 35),
];

/// Step for anything longer than the last table row.
const WIDEST_STEP: i32 = 40;

/// Pick the tick step for `start_year..=end_year`.
pub fn tick_step(start_year: i32, end_year: i32) -> i32 {
    let span = end_year - start_year;
    STEP_TABLE
        .iter()
        .find(|&&(upper, _)| span <= upper)
        .map_or(WIDEST_STEP, |&(_, step)| step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_boundaries() {
        let cases = [
            (0, 3),
            (29, 3),
            (30, 5),
            (59, 5),
            (60, 10),
            (104, 10),
            (105, 15),
            (139, 15),
            (140, 20),
            (174, 20),
            (175, 25),
            (323, 25),
            (324, 30),
            (388, 30),
            (389, 35),
            (453, 35),
            (454, 40),
            (519, 40),
        ];
        for (span, step) in cases {
            assert_eq!(tick_step(1500, 1500 + span), step, "span {span}");
        }
    }

    #[test]
    fn documented_examples() {
        assert_eq!(tick_step(1800, 1829), 3);
        assert_eq!(tick_step(1800, 1830), 5);
        assert_eq!(tick_step(1500, 2019), 40);
        assert_eq!(tick_step(1800, 2019), 25);
    }
}
