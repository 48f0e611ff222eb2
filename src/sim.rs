//! Driving a predictor over a stream of branch records.

use log::trace;

use crate::branch::*;
use crate::predictor::BranchPredictor;
use crate::stats::BranchStats;

/// Predict and then train on each record in program order.
pub fn simulate<'a, P, I>(predictor: &mut P, records: I) -> BranchStats
where
    P: BranchPredictor + ?Sized,
    I: IntoIterator<Item = &'a BranchRecord>,
{
    let mut stat = BranchStats::new(predictor.name());
    for record in records {
        step(predictor, &mut stat, record);
    }
    stat
}

/// Evaluate a single record: predict, record the result, then train.
pub fn step<P>(predictor: &mut P, stat: &mut BranchStats, record: &BranchRecord)
    -> Outcome
where
    P: BranchPredictor + ?Sized,
{
    let prediction = predictor.predict(record.pc);
    if prediction != record.outcome {
        trace!("miss pc={:08x} predicted={:?} actual={:?}",
            record.pc, prediction, record.outcome);
    }
    stat.update(record, prediction);
    predictor.train(record.pc, record.outcome);
    prediction
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::*;
    use crate::predictor::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn static_misses_every_not_taken() {
        init_logger();
        let records: Vec<BranchRecord> = (0..100u32)
            .map(|i| BranchRecord::new(0x400 + 4 * (i % 5), Outcome::from(i % 4 != 0)))
            .collect();
        let mut p = Predictor::build(&PredictorConfig::default()).unwrap();
        let stat = simulate(&mut p, &records);
        assert_eq!(stat.predictor, "Static");
        assert_eq!(stat.global_brns(), 100);
        assert_eq!(stat.global_miss(), 25);
    }

    #[test]
    fn stream_and_step_agree() {
        init_logger();
        let records: Vec<BranchRecord> = (0..500u32)
            .map(|i| BranchRecord::new(0x1000 + 8 * (i % 7), Outcome::from(i % 3 == 0)))
            .collect();
        let cfg = PredictorConfig::with_kind(PredictorKind::Tournament);

        let mut a = Predictor::build(&cfg).unwrap();
        let batch = simulate(&mut a, &records);

        let mut b = Predictor::build(&cfg).unwrap();
        let mut stepped = BranchStats::new(b.name());
        for r in &records {
            step(&mut b, &mut stepped, r);
        }
        assert_eq!(batch, stepped);
        assert_eq!(a, b);
    }
}
