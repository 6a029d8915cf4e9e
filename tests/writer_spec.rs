use std::collections::BTreeMap;

use nnav_bridge::error::BridgeError;
use nnav_bridge::models::*;
use nnav_bridge::xml::{read_marker_file, render_marker_file, write_marker_file};
use speculate2::speculate;

fn pose(tx: f64, ty: f64, tz: f64) -> Pose {
    Pose::from_rows([
        [0.36, 0.48, -0.8, tx],
        [-0.8, 0.6, 0.0, ty],
        [0.48, 0.64, 0.6, tz],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

fn instrument_file() -> MarkerFile {
    let mut file = MarkerFile::instrument(CoordinateSpace::Lps);
    for (i, label) in ["hotspot", "APB <left> & \"FDI\""].iter().enumerate() {
        let mut marker = Marker::new(pose(-35.123456789012, 12.5 * i as f64, 1e-12), CoordinateSpace::Lps);
        marker.index = Some(i as u32);
        marker.label = Some(label.to_string());
        marker.color = "#00ff00".to_string();
        marker.selected = i == 0;
        marker.always_visible = i == 1;
        marker.additional_information = "note".to_string();
        file.markers.push(marker);
    }
    file
}

fn trigger_file() -> MarkerFile {
    let mut file = MarkerFile::trigger(CoordinateSpace::Ras);
    file.is_online_reading = Some(true);
    file.start_time = Some(1574346823845);
    file.response_parameters = Some(ResponseParameters {
        selected_response_channel: Some("1".to_string()),
        descriptors: vec![ResponseDescriptor {
            id: "1".to_string(),
            name: "EMG".to_string(),
            unit: "uV".to_string(),
            min_value: Some(0.0),
            max_value: Some(1000.0),
        }],
    });

    for i in 0..3u32 {
        let mut marker = Marker::new(pose(1.0, 2.0, f64::from(i)), CoordinateSpace::Ras);
        marker.recording_time = Some(4710 + u64::from(i) * 500);
        marker.visible = i != 2;
        if i > 0 {
            let intensity = 60.0 + f64::from(i);
            marker.response_values = BTreeMap::from([
                ("valueA".to_string(), intensity),
                ("amplitudeA".to_string(), 44.0),
            ]);
        }
        file.markers.push(marker);
    }
    file
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
    }

    describe "round trip" {
        it "preserves every recognized instrument field" {
            let file = instrument_file();
            let path = dir.path().join("InstrumentMarkers.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read, file);
        }

        it "preserves every recognized trigger field" {
            let file = trigger_file();
            let path = dir.path().join("TriggerMarkers.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read, file);
        }

        it "keeps NaN response values" {
            let mut file = trigger_file();
            file.markers[1].response_values.insert("response".to_string(), f64::NAN);
            let path = dir.path().join("nan.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert!(read.markers[1].response_values["response"].is_nan());
            assert_eq!(read.markers[1].response_values["valueA"], 61.0);
        }

        it "preserves a trigger marker whose only response is valueA" {
            let mut file = MarkerFile::trigger(CoordinateSpace::Ras);
            let mut marker = Marker::new(pose(1.0, 2.0, 3.0), CoordinateSpace::Ras);
            marker.response_values.insert("valueA".to_string(), 55.0);
            file.markers.push(marker);
            let path = dir.path().join("value_a.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read, file);
            assert_eq!(read.markers[0].stimulation_intensity(), Some(55.0));
        }

        it "stores an intensity set on the marker as valueA" {
            let mut file = MarkerFile::trigger(CoordinateSpace::Ras);
            let mut marker = Marker::new(pose(1.0, 2.0, 3.0), CoordinateSpace::Ras);
            marker.set_stimulation_intensity(Some(72.5));
            file.markers.push(marker);
            let path = dir.path().join("intensity.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read, file);
            assert_eq!(read.markers[0].response_values.len(), 1);
            assert_eq!(read.markers[0].stimulation_intensity(), Some(72.5));
        }

        it "preserves instrument markers without an index" {
            let mut file = instrument_file();
            file.markers[1].index = None;
            let path = dir.path().join("no_index.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read, file);
            assert_eq!(read.markers[1].index, None);
        }

        it "preserves carriage returns in labels" {
            let mut file = instrument_file();
            file.markers[0].label = Some("a\rb".to_string());
            file.markers[1].additional_information = "line\r\nnext".to_string();
            let path = dir.path().join("carriage_return.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read.markers[0].label.as_deref(), Some("a\rb"));
            assert_eq!(read.markers[1].additional_information, "line\r\nnext");
        }

        it "keeps full double precision" {
            let mut file = MarkerFile::instrument(CoordinateSpace::Ras);
            let mut marker = Marker::new(
                Pose::from_rows([
                    [0.1 + 0.2, 1.0 / 3.0, 2f64.sqrt(), -123.456789012345],
                    [f64::MIN_POSITIVE, 1.0, 0.0, 1e300],
                    [0.0, 0.0, 1.0, -0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ]),
                CoordinateSpace::Ras,
            );
            marker.index = Some(0);
            file.markers.push(marker);
            let path = dir.path().join("precision.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read.markers[0].pose.to_rows(), file.markers[0].pose.to_rows());
            assert!(read.markers[0].pose.approx_eq(&file.markers[0].pose, 1e-9));
        }
    }

    describe "untracked markers" {
        it "are never written" {
            let mut file = trigger_file();
            file.markers.insert(1, Marker::new(Pose::zero(), CoordinateSpace::Ras));
            let path = dir.path().join("untracked.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read.markers.len(), 3);
            assert!(read.markers.iter().all(|m| !m.is_untracked()));
        }
    }

    describe "fields outside a schema" {
        it "reads hidden instrument markers back as visible" {
            let mut file = instrument_file();
            file.markers[0].visible = false;
            let path = dir.path().join("hidden.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert!(read.markers[0].visible);
        }

        it "drops instrument-only attributes from trigger markers" {
            let mut file = trigger_file();
            file.markers[0].index = Some(3);
            file.markers[0].always_visible = true;
            file.markers[0].additional_information = "note".to_string();
            let path = dir.path().join("trigger_extra.xml");

            write_marker_file(&file, &path).expect("Failed to write");
            let read = read_marker_file(&path).expect("Failed to read");

            assert_eq!(read.markers[0].index, None);
            assert!(!read.markers[0].always_visible);
            assert_eq!(read.markers[0].additional_information, "");
        }
    }

    describe "schema" {
        it "writes the vendor element and attribute names" {
            let xml = render_marker_file(&trigger_file());

            assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
            assert!(xml.contains(
                "<TriggerMarkerList coordinateSpace=\"RAS\" isOnlineReading=\"true\" startTime=\"1574346823845\">"
            ));
            assert!(xml.contains("<ResponseParameters selectedResponseChannel=\"1\">"));
            assert!(xml.contains(
                "<responseDescription id=\"1\" maxValue=\"1000.0\" minValue=\"0.0\" name=\"EMG\" unit=\"uV\"/>"
            ));
            assert!(xml.contains("<Value key=\"valueA\" response=\"61.0\"/>"));
            assert!(xml.contains("data00=\"0.36\""));
            assert!(xml.trim_end().ends_with("</TriggerMarkerList>"));
        }

        it "writes intensity-less trigger markers without response values" {
            let mut file = MarkerFile::trigger(CoordinateSpace::Ras);
            file.markers.push(Marker::new(Pose::identity(), CoordinateSpace::Ras));

            let xml = render_marker_file(&file);
            assert!(!xml.contains("ResponseValues"));
            assert!(!xml.contains("valueA"));
        }
    }

    describe "errors" {
        it "fails with an io error on an unwritable path" {
            let path = dir.path().join("missing").join("out.xml");
            let result = write_marker_file(&instrument_file(), &path);

            assert!(matches!(result, Err(BridgeError::Io { .. })));
            assert!(!path.exists());
        }

        it "replaces an existing file in one step" {
            let path = dir.path().join("out.xml");
            std::fs::write(&path, "old").expect("Failed to write fixture");

            write_marker_file(&instrument_file(), &path).expect("Failed to write");

            let read = read_marker_file(&path).expect("Failed to read");
            assert_eq!(read.markers.len(), 2);
            let leftovers = std::fs::read_dir(dir.path()).expect("Failed to list").count();
            assert_eq!(leftovers, 1);
        }
    }
}
