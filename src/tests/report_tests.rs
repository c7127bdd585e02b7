#[cfg(test)]
mod report_tests {
    use chrono::Duration;

    use crate::config::{EnergySettings, GradeBasis};
    use crate::intervals::DEFAULT_GAP_MINUTES;
    use crate::metrics::EfficiencyGrade;
    use crate::models::ReadingTable;
    use crate::report::analyze;
    use crate::tests::helpers::{cadence, some, table, ts};

    fn run(t: &ReadingTable, settings: &EnergySettings) -> crate::report::AnalysisReport {
        analyze(t, settings, Duration::minutes(DEFAULT_GAP_MINUTES))
    }

    #[test]
    fn missing_hardware_hides_sections_instead_of_failing() {
        // One temperature probe, no outdoor sensor, no motion sensors.
        let t = table(
            cadence("2024-01-15 06:00:00", 4, 5),
            vec![
                ("Thermostat Temperature (F)", some(&[70.0, 70.2, 70.1, 70.3])),
                ("Heat Stage 1 (sec)", some(&[300.0, 300.0, 300.0, 300.0])),
            ],
        );
        let report = run(&t, &EnergySettings::default());

        assert!(report.energy.restricted.is_none());
        assert_eq!(report.energy.grade, EfficiencyGrade::InsufficientData);
        assert!(report.room_balance.is_none());
        assert!(report.motion.is_empty());
        // The unrelated sections still came out populated.
        assert_eq!(report.energy.totals.heat_minutes, 20.0);
        assert_eq!(report.temperature.len(), 1);
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn restricted_section_appears_with_an_outdoor_channel() {
        let t = table(
            cadence("2024-01-15 06:00:00", 4, 5),
            vec![
                ("Outdoor Temp (F)", some(&[45.0, 45.0, 35.0, 45.0])),
                ("Heat Stage 1 (sec)", some(&[300.0; 4])),
                ("Aux Heat 1 (sec)", some(&[0.0; 4])),
            ],
        );
        let report = run(&t, &EnergySettings::default());

        let restricted = report.energy.restricted.expect("restricted section");
        assert_eq!(restricted.heat_minutes, 15.0);
        assert_eq!(restricted.aux_percentage, 0.0);
    }

    #[test]
    fn duplicate_timestamps_both_feed_the_resample_bucket() {
        // The export is not deduplicated; two readings on the same stamp
        // both contribute to their bucket's mean.
        let t0 = ts("2024-01-15 06:00:00");
        let t = table(
            vec![t0, t0, t0 + Duration::minutes(5)],
            vec![("Thermostat Temperature (F)", some(&[70.0, 72.0, 80.0]))],
        );
        let points = t
            .resample_mean("Thermostat Temperature (F)", Duration::minutes(5))
            .unwrap();
        assert_eq!(points, vec![(t0, 71.0), (t0 + Duration::minutes(5), 80.0)]);
    }

    #[test]
    fn setpoints_resample_into_their_own_series() {
        let t = table(
            cadence("2024-01-15 06:00:00", 4, 5),
            vec![
                ("Thermostat Temperature (F)", some(&[70.0; 4])),
                ("Bedroom (F)", some(&[71.0; 4])),
                ("Heat Set Temp (F)", some(&[68.0; 4])),
            ],
        );
        let report = run(&t, &EnergySettings::default());
        assert_eq!(report.temperature.len(), 2);
        assert_eq!(report.setpoints.len(), 1);
        assert_eq!(report.setpoints[0].channel, "Heat Set Temp (F)");
    }

    #[test]
    fn poor_grade_drives_threshold_recommendations() {
        // Plenty of warm-weather aux: C Poor on the overall basis.
        let t = table(
            cadence("2024-01-15 06:00:00", 10, 5),
            vec![
                ("Heat Stage 1 (sec)", some(&[300.0; 10])),
                ("Aux Heat 1 (sec)", some(&[150.0; 10])),
            ],
        );
        let settings = EnergySettings {
            grade_basis: GradeBasis::Overall,
            ..EnergySettings::default()
        };
        let report = run(&t, &settings);

        assert!(matches!(
            report.energy.grade,
            EfficiencyGrade::Scored { score: 50, .. }
        ));
        assert!(report
            .recommendations
            .iter()
            .any(|tip| tip.contains("threshold")));
    }

    #[test]
    fn quiet_system_gets_the_all_clear_tip() {
        let t = table(
            cadence("2024-01-15 06:00:00", 2, 5),
            vec![("Thermostat Temperature (F)", some(&[70.0, 70.0]))],
        );
        let report = run(&t, &EnergySettings::default());
        assert_eq!(
            report.recommendations,
            vec!["The system is running efficiently.".to_string()]
        );
    }
}
