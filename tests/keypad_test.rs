use evtrack::keypad::{Key, Keypad, KeypadBuffer, KeypadOutcome, NumberInput};

fn press_all(keypad: &Keypad, keys: &str) {
    for c in keys.chars() {
        assert!(keypad.press(Key::from_char(c).unwrap()));
    }
}

#[test]
fn integer_entry_is_clamped_as_typed() {
    let mut buffer = KeypadBuffer::new(Some("0"), true);
    for (key, shown) in [('1', "1"), ('5', "15"), ('0', "100"), ('5', "100")] {
        buffer.press(Key::from_char(key).unwrap());
        assert_eq!(buffer.text(), shown);
    }
}

#[test]
fn decimal_entry_rules() {
    let mut buffer = KeypadBuffer::new(None, false);
    buffer.press(Key::Point);
    buffer.press(Key::Point);
    assert_eq!(buffer.text(), "0.");

    let mut buffer = KeypadBuffer::new(Some("12.5"), false);
    for _ in 0..10 {
        buffer.press(Key::Delete);
        assert!(!buffer.text().is_empty());
    }
    assert_eq!(buffer.text(), "0");
}

#[tokio::test]
async fn request_waits_for_done() {
    let keypad = Keypad::new();
    let request = keypad.request_number("Total kWh added", Some("0"), false);

    let driver = async {
        tokio::task::yield_now().await;
        press_all(&keypad, "18.25");
        assert_eq!(keypad.display().as_deref(), Some("18.25"));
        keypad.confirm();
    };

    let (outcome, ()) = tokio::join!(request, driver);
    assert_eq!(outcome, KeypadOutcome::Value(18.25));
}

#[tokio::test]
async fn integer_request_confirms_clamped_value() {
    let keypad = Keypad::new();
    let request = keypad.request_number("Current SOC (%)", Some("50"), true);
    assert_eq!(keypad.layout().unwrap()[9], None);
    press_all(&keypad, "<<150");
    assert_eq!(keypad.display().as_deref(), Some("100"));
    keypad.confirm();
    assert_eq!(request.await, KeypadOutcome::Value(100.0));
}

#[tokio::test]
async fn number_input_trait_goes_through_keypad() {
    let keypad = Keypad::new();
    let input: &dyn NumberInput = &keypad;

    let read = input.read_number("Total kWh added", "3.5", false);
    let driver = async {
        tokio::task::yield_now().await;
        assert_eq!(keypad.display().as_deref(), Some("3.5"));
        keypad.cancel();
    };

    let (outcome, ()) = tokio::join!(read, driver);
    assert!(outcome.is_cancelled());
    assert_eq!(outcome.value(), None);
}

#[tokio::test]
async fn dropped_keypad_resolves_cancelled() {
    let keypad = Keypad::new();
    let request = keypad.request_number("Current SOC (%)", None, true);
    drop(keypad);
    assert_eq!(request.await, KeypadOutcome::Cancelled);
}
