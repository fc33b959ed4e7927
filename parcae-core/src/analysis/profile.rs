use crate::binning::ActivityVector;

/// Fraction of days each time-of-day bin was active.
///
/// Only whole days contribute; the result always has one entry per bin of
/// the day.
pub fn daily_profile(vector: &ActivityVector) -> Vec<f64> {
    let bins_per_day = vector.bins_per_day();
    let n_days = vector.n_days();
    let mut profile = vec![0.0; bins_per_day];
    if n_days == 0 {
        return profile;
    }

    for day in vector.bins().chunks_exact(bins_per_day) {
        for (acc, &b) in profile.iter_mut().zip(day) {
            if b != 0 {
                *acc += 1.0;
            }
        }
    }
    let n = n_days as f64;
    profile.iter_mut().for_each(|p| *p /= n);
    profile
}
