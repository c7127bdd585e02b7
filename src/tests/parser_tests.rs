#[cfg(test)]
mod parser_tests {
    use crate::channels::{AirQualityKind, ChannelKind};
    use crate::config::{HeaderRows, LoadOptions};
    use crate::errors::ParseError;
    use crate::parser::parse_export;
    use crate::tests::helpers::export_text;

    const HEADER: &str = "Date,Time,Thermostat Temperature (F),Heat Stage 1 (sec)";

    fn default_rows() -> Vec<&'static str> {
        vec![
            "2024-01-15,06:00:00,68.5,300",
            "2024-01-15,06:05:00,68.7,300",
            "2024-01-15,06:10:00,69.0,0",
        ]
    }

    #[test]
    fn parses_well_formed_export() {
        let text = export_text(5, HEADER, &default_rows());
        let table = parse_export(text.as_bytes(), &LoadOptions::default()).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.timestamps().windows(2).all(|w| w[0] <= w[1]));
        let temps = table.column("Thermostat Temperature (F)").unwrap();
        assert_eq!(temps[0], Some(68.5));
        assert_eq!(table.column_sum("Heat Stage 1 (sec)"), Some(600.0));
    }

    #[test]
    fn trims_whitespace_from_header_names() {
        let text = export_text(
            4,
            " Date , Time , Thermostat Temperature (F) , Heat Stage 1 (sec) ",
            &default_rows(),
        );
        let table = parse_export(text.as_bytes(), &LoadOptions::default()).unwrap();
        assert!(table.column("Thermostat Temperature (F)").is_some());
    }

    #[test]
    fn auto_detects_both_metadata_row_counts() {
        for meta_rows in [4, 5] {
            let text = export_text(meta_rows, HEADER, &default_rows());
            let table = parse_export(text.as_bytes(), &LoadOptions::default())
                .unwrap_or_else(|e| panic!("{} metadata rows: {}", meta_rows, e));
            assert_eq!(table.len(), 3, "{} metadata rows", meta_rows);
        }
    }

    #[test]
    fn fixed_header_rows_override() {
        let text = export_text(5, HEADER, &default_rows());
        let options = LoadOptions {
            header_rows: HeaderRows::Fixed(5),
            ..LoadOptions::default()
        };
        let table = parse_export(text.as_bytes(), &options).unwrap();
        assert_eq!(table.len(), 3);

        // Pointing the fixed skip at a metadata row means no Date column.
        let options = LoadOptions {
            header_rows: HeaderRows::Fixed(3),
            ..LoadOptions::default()
        };
        let err = parse_export(text.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { .. }));
    }

    #[test]
    fn header_not_found_within_probe_window() {
        let junk = vec!["noise,noise"; 12].join("\n");
        let err = parse_export(junk.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::HeaderNotFound { .. }));
    }

    #[test]
    fn drops_rows_with_missing_date_or_time() {
        let rows = vec![
            "2024-01-15,06:00:00,68.5,300",
            ",06:05:00,68.7,300",
            "2024-01-15,,69.0,0",
            "2024-01-15,06:15:00,69.2,0",
        ];
        let text = export_text(5, HEADER, &rows);
        let table = parse_export(text.as_bytes(), &LoadOptions::default()).unwrap();

        // Row count after the drop is at most the input row count, and every
        // surviving row has a timestamp by construction.
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn one_bad_timestamp_literal_aborts_the_load() {
        let rows = vec![
            "2024-01-15,06:00:00,68.5,300",
            "2024-01-15,not-a-time,68.7,300",
        ];
        let text = export_text(5, HEADER, &rows);
        let err = parse_export(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        match err {
            ParseError::Timestamp { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "2024-01-15 not-a-time");
            }
            other => panic!("expected timestamp error, got {other}"),
        }
    }

    #[test]
    fn missing_time_column_is_malformed_input() {
        let text = export_text(5, "Date,Thermostat Temperature (F)", &["2024-01-15,68.5"]);
        let err = parse_export(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        match err {
            ParseError::MissingColumn { column } => assert_eq!(column, "Time"),
            other => panic!("expected missing column, got {other}"),
        }
    }

    #[test]
    fn non_numeric_cell_becomes_null_not_a_failure() {
        let rows = vec![
            "2024-01-15,06:00:00,68.5,300",
            "2024-01-15,06:05:00,corrupt,300",
        ];
        let text = export_text(5, HEADER, &rows);
        let table = parse_export(text.as_bytes(), &LoadOptions::default()).unwrap();
        let temps = table.column("Thermostat Temperature (F)").unwrap();
        assert_eq!(temps, &[Some(68.5), None]);
    }

    #[test]
    fn repair_reclassifies_generic_sensor_columns() {
        let header = "Date,Time,Thermostat 1,Thermostat 2,Thermostat 3";
        let rows = vec![
            "2024-01-15,06:00:00,101200,150,420",
            "2024-01-15,06:05:00,101250,6200,455",
            "2024-01-15,06:10:00,101300,180,430",
        ];
        let text = export_text(5, header, &rows);
        let table = parse_export(text.as_bytes(), &LoadOptions::default()).unwrap();
        let catalog = table.catalog();

        assert_eq!(
            catalog.kind_of("Thermostat 1"),
            ChannelKind::AirQuality(AirQualityKind::Pressure)
        );
        assert_eq!(
            catalog.kind_of("Thermostat 2"),
            ChannelKind::AirQuality(AirQualityKind::Voc)
        );
        assert_eq!(
            catalog.kind_of("Thermostat 3"),
            ChannelKind::AirQuality(AirQualityKind::Co2)
        );
    }

    #[test]
    fn repair_pass_can_be_disabled() {
        let header = "Date,Time,Thermostat 1";
        let rows = vec!["2024-01-15,06:00:00,101200"];
        let text = export_text(5, header, &rows);
        let options = LoadOptions {
            repair_channels: false,
            ..LoadOptions::default()
        };
        let table = parse_export(text.as_bytes(), &options).unwrap();
        assert_eq!(table.catalog().kind_of("Thermostat 1"), ChannelKind::Unknown);
    }
}
