use crate::{
    config::CONFIG_PATH,
    context::TrapContext,
    event_log::LogMessage,
    ports::SensorError,
    profile::Profile,
    settings::TapCount,
    storage::{FlashVolume, MemFlash, Volume},
    testing::{at, backing, file_text, mount, FakeRtc, FakeSensor},
};

type TestContext<'a> = TrapContext<FlashVolume<MemFlash<'a>>, FakeRtc, FakeSensor>;

fn boot(backing: &mut [u8]) -> TestContext<'_> {
    TrapContext::boot(
        mount(backing),
        FakeRtc::at(at(2024, 6, 1, 8, 30, 0)),
        FakeSensor::default(),
        Profile::KNOCK,
    )
    .expect("boot")
}

fn send(context: &mut TestContext<'_>, line: &str) -> String {
    let mut out = String::new();
    context.handle_line(line, 0, &mut out).expect("respond");
    out
}

#[test]
fn help_lists_every_command() {
    let mut backing = backing();
    let mut context = boot(&mut backing);

    let help = send(&mut context, "HELP");
    for keyword in [
        "SHOW_LOGS",
        "CLEAR_LOGS",
        "SYNC_TIME",
        "SET_RTC",
        "READ_TIME",
        "SET_NAME",
        "SET_LINE_COUNT",
        "ADD_NOTE",
        "SHOW_CONFIG",
        "CURRENT_CONFIG",
        "SET_TAP",
        "SET_SENSITIVITY",
    ] {
        assert!(help.contains(keyword), "{keyword} missing from help");
    }
    assert!(help.lines().all(|line| !line.is_empty()));
    assert!(help.ends_with("\r\n"));
}

#[test]
fn unknown_command_is_inert() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    context
        .record_event(LogMessage::Triggered, 0)
        .expect("seed event");
    let config_before = context.config().clone();
    let record_before = file_text(context.volume_mut(), CONFIG_PATH);
    let log_before = file_text(context.volume_mut(), "/Trap_Default_logs.txt");

    for line in ["FOO", "SHOW_LOGS now", "SET-NAME x", "help me"] {
        assert_eq!(
            send(&mut context, line),
            "Unknown command. Type HELP for a list of commands.\r\n"
        );
    }

    assert_eq!(context.config(), &config_before);
    assert_eq!(file_text(context.volume_mut(), CONFIG_PATH), record_before);
    assert_eq!(
        file_text(context.volume_mut(), "/Trap_Default_logs.txt"),
        log_before
    );
}

#[test]
fn show_config_aliases_report_current_values() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    context.rtc_mut().temperature = Some(21.25);

    let shown = send(&mut context, "show_config");
    assert_eq!(send(&mut context, "CURRENT_CONFIG"), shown);
    assert_eq!(
        shown,
        "Trap Name: Trap_Default\r\n\
         Max Log Lines: 30\r\n\
         Tap Count: 1\r\n\
         Sensitivity: 80 (1-127)\r\n\
         RTC Time: 2024-06-01 08:30:00\r\n\
         Temperature: 21.25C\r\n"
    );
}

#[test]
fn set_line_count_validates_and_persists() {
    let mut backing = backing();
    let mut context = boot(&mut backing);

    assert_eq!(send(&mut context, "SET_LINE_COUNT 0"), "Error: Line count must be positive.\r\n");
    assert_eq!(send(&mut context, "SET_LINE_COUNT -3"), "Error: Line count must be positive.\r\n");
    assert_eq!(send(&mut context, "SET_LINE_COUNT abc"), "Error: Line count must be positive.\r\n");
    assert_eq!(context.config().max_log_lines, 30);

    assert_eq!(send(&mut context, "SET_LINE_COUNT 12"), "Line count set to: 12\r\n");
    assert_eq!(context.config().max_log_lines, 12);
    assert!(file_text(context.volume_mut(), CONFIG_PATH)
        .expect("record")
        .contains("max_log_lines=12\n"));
}

#[test]
fn set_tap_and_sensitivity_rearm_sensor() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    assert_eq!(context.sensor_mut().applied, vec![(TapCount::Single, 80)]);

    assert_eq!(send(&mut context, "SET_TAP 3"), "Error: Tap count must be 1 or 2.\r\n");
    assert_eq!(send(&mut context, "SET_TAP 2"), "Tap count set to: 2\r\n");
    assert_eq!(
        send(&mut context, "SET_SENSITIVITY 128"),
        "Error: Sensitivity must be between 1 and 127.\r\n"
    );
    assert_eq!(
        send(&mut context, "SET_SENSITIVITY 0"),
        "Error: Sensitivity must be between 1 and 127.\r\n"
    );
    assert_eq!(send(&mut context, "SET_SENSITIVITY 40"), "Sensitivity set to: 40\r\n");

    assert_eq!(
        context.sensor_mut().applied,
        vec![
            (TapCount::Single, 80),
            (TapCount::Double, 80),
            (TapCount::Double, 40),
        ]
    );
    let record = file_text(context.volume_mut(), CONFIG_PATH).expect("record");
    assert!(record.contains("tap_count=2\n"));
    assert!(record.contains("sensitivity=40\n"));
}

#[test]
fn sensor_rearm_failure_does_not_block_change() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    context.sensor_mut().fail = Some(SensorError::Bus);

    assert_eq!(send(&mut context, "SET_TAP 2"), "Tap count set to: 2\r\n");
    assert_eq!(context.config().tap_count, TapCount::Double);
}

#[test]
fn sensitivity_bound_follows_profile() {
    let mut backing = backing();
    let mut context = TrapContext::boot(
        mount(&mut backing),
        FakeRtc::at(at(2024, 6, 1, 8, 30, 0)),
        FakeSensor::default(),
        Profile::BUTTON,
    )
    .expect("boot");

    assert_eq!(send(&mut context, "SET_SENSITIVITY 200"), "Sensitivity set to: 200\r\n");
    assert_eq!(
        send(&mut context, "SET_SENSITIVITY 201"),
        "Error: Sensitivity must be between 1 and 200.\r\n"
    );
}

#[test]
fn set_name_rebinds_log_and_persists() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    context.record_event(LogMessage::Triggered, 0).expect("event");

    assert_eq!(send(&mut context, "SET_NAME"), "Error: Trap name cannot be empty.\r\n");
    assert_eq!(
        send(&mut context, &format!("SET_NAME {}", "n".repeat(33))),
        "Error: Trap name too long (max 32).\r\n"
    );
    assert_eq!(context.config().trap_name.as_str(), "Trap_Default");

    assert_eq!(send(&mut context, "SET_NAME Barn Owl"), "Trap name set to: Barn Owl\r\n");
    assert_eq!(context.volume_mut().len("/Trap_Default_logs.txt"), Ok(None));
    assert_eq!(send(&mut context, "SHOW_LOGS"), "No logs found.\r\n");
    assert!(file_text(context.volume_mut(), CONFIG_PATH)
        .expect("record")
        .starts_with("trap_name=Barn Owl\n"));

    context.record_event(LogMessage::Triggered, 0).expect("event");
    assert_eq!(
        send(&mut context, "SHOW_LOGS"),
        "Barn Owl - 2024-06-01 08:30:00 - TRIGGERED\r\n"
    );
}

#[test]
fn notes_are_logged_with_case_preserved() {
    let mut backing = backing();
    let mut context = boot(&mut backing);

    assert_eq!(send(&mut context, "ADD_NOTE"), "Error: Note message required.\r\n");
    assert_eq!(send(&mut context, "add_note Bait Replaced"), "Note added.\r\n");
    assert_eq!(
        send(&mut context, "SHOW_LOGS"),
        "Trap_Default - 2024-06-01 08:30:00 - NOTE Bait Replaced\r\n"
    );
}

#[test]
fn control_characters_are_refused() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    let record_before = file_text(context.volume_mut(), CONFIG_PATH);

    assert_eq!(
        send(&mut context, "SET_NAME a\nb"),
        "Error: Trap name cannot contain control characters.\r\n"
    );
    assert_eq!(
        send(&mut context, "SET_NAME bell\u{7}"),
        "Error: Trap name cannot contain control characters.\r\n"
    );
    assert_eq!(context.config().trap_name.as_str(), "Trap_Default");
    assert_eq!(file_text(context.volume_mut(), CONFIG_PATH), record_before);

    assert_eq!(
        send(&mut context, "ADD_NOTE x\ny"),
        "Error: Note cannot contain control characters.\r\n"
    );
    assert_eq!(send(&mut context, "SHOW_LOGS"), "No logs found.\r\n");
}

#[test]
fn long_retention_keeps_logging_when_slot_fills() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    assert_eq!(send(&mut context, "SET_LINE_COUNT 500"), "Line count set to: 500\r\n");

    for at_ms in 0..300 {
        context.record_trigger(at_ms).expect("trigger logged");
    }
    assert_eq!(send(&mut context, "ADD_NOTE hi"), "Note added.\r\n");

    let logs = send(&mut context, "SHOW_LOGS");
    let lines: Vec<&str> = logs.lines().collect();
    assert!(lines.len() < 301);
    assert!(lines[..lines.len() - 1]
        .iter()
        .all(|line| line.ends_with(" - KNOCK DETECTED")));
    assert!(lines[lines.len() - 1].ends_with(" - NOTE hi"));
}

#[test]
fn clear_logs_empties_history() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    context.record_trigger(0).expect("event");

    assert_eq!(send(&mut context, "CLEAR_LOGS"), "Logs cleared.\r\n");
    assert_eq!(send(&mut context, "SHOW_LOGS"), "No logs found.\r\n");
    assert_eq!(send(&mut context, "CLEAR_LOGS"), "Logs cleared.\r\n");
}

#[test]
fn rtc_commands() {
    let mut backing = backing();
    let mut context = boot(&mut backing);

    assert_eq!(
        send(&mut context, "SET_RTC 2024-13-01 00:00:00"),
        "Error: Invalid format. Use SET_RTC YYYY-MM-DD HH:MM:SS\r\n"
    );
    assert_eq!(
        send(&mut context, "SET_RTC 2024/01/01 00:00:00"),
        "Error: Invalid format. Use SET_RTC YYYY-MM-DD HH:MM:SS\r\n"
    );
    assert!(context.rtc_mut().adjusted.is_empty());

    assert_eq!(send(&mut context, "SET_RTC 2024-01-01 00:00:00"), "RTC updated.\r\n");
    assert_eq!(send(&mut context, "READ_TIME"), "RTC Time: 2024-01-01 00:00:00\r\n");
    assert_eq!(send(&mut context, "SYNC_TIME"), "System time synced with RTC.\r\n");
    assert_eq!(
        context.system_clock.now(65_000),
        Some(at(2024, 1, 1, 0, 1, 5))
    );
}

#[test]
fn rtc_failure_surfaces_as_response() {
    let mut backing = backing();
    let mut context = TrapContext::boot(
        mount(&mut backing),
        FakeRtc::broken(),
        FakeSensor::default(),
        Profile::KNOCK,
    )
    .expect("boot");

    assert_eq!(send(&mut context, "READ_TIME"), "Error: RTC unavailable.\r\n");
    assert_eq!(send(&mut context, "SYNC_TIME"), "Error: RTC unavailable.\r\n");
    assert_eq!(
        send(&mut context, "SET_RTC 2024-01-01 00:00:00"),
        "Error: RTC unavailable.\r\n"
    );
    assert!(send(&mut context, "SHOW_CONFIG").contains("RTC Time: unavailable\r\n"));

    // Events are still kept, stamped from the fallback clock.
    assert_eq!(send(&mut context, "ADD_NOTE still here"), "Note added.\r\n");
    assert_eq!(
        send(&mut context, "SHOW_LOGS"),
        "Trap_Default - 2000-01-01 00:00:00 - NOTE still here\r\n"
    );
}

#[test]
fn storage_failure_surfaces_as_response() {
    let mut backing = backing();
    let mut context = boot(&mut backing);
    context.volume_mut().flash_mut().fail_after(0);

    assert_eq!(send(&mut context, "SET_LINE_COUNT 5"), "Error: Failed to save config.\r\n");
    assert_eq!(context.config().max_log_lines, 5);
    assert_eq!(send(&mut context, "ADD_NOTE lost"), "Error: Failed to write log.\r\n");
    assert_eq!(send(&mut context, "SHOW_LOGS"), "No logs found.\r\n");

    context.volume_mut().flash_mut().heal();
    assert_eq!(send(&mut context, "SET_LINE_COUNT 5"), "Line count set to: 5\r\n");
}

#[test]
fn boot_fails_only_when_sensor_cannot_be_armed() {
    let mut backing = backing();
    let sensor = FakeSensor {
        fail: Some(SensorError::NotFound),
        ..FakeSensor::default()
    };
    let booted = TrapContext::boot(
        mount(&mut backing),
        FakeRtc::at(at(2024, 1, 1, 0, 0, 0)),
        sensor,
        Profile::KNOCK,
    );
    assert!(matches!(
        booted,
        Err(crate::context::BootError::Sensor(SensorError::NotFound))
    ));
}

#[test]
fn boot_reloads_persisted_config() {
    let mut backing = backing();
    {
        let mut context = boot(&mut backing);
        send(&mut context, "SET_NAME Shed");
        send(&mut context, "SET_SENSITIVITY 99");
    }
    let mut context = boot(&mut backing);
    assert_eq!(context.config().trap_name.as_str(), "Shed");
    assert_eq!(context.config().sensitivity, 99);
    assert_eq!(context.sensor_mut().applied, vec![(TapCount::Single, 99)]);
}
