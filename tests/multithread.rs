use std::thread;

#[test]
fn independent_threads() {
    let handles: Vec<_> = (1..=8)
        .map(|n| {
            thread::spawn(move || {
                let x = f64::from(n);
                calc::evaluate("_1 * _1 + _0", &[x]).unwrap()
            })
        })
        .collect();

    for (n, handle) in (1..=8).zip(handles) {
        let x = f64::from(n);
        assert_eq!(handle.join().unwrap(), x * x + 1.0);
    }
}

#[test]
fn shared_tree() {
    let expression = calc::parse("_1 >= 0 && sin(_1) || abs(_1)").unwrap();
    thread::scope(|scope| {
        for n in -4..4 {
            let expression = &expression;
            scope.spawn(move || {
                let args = calc::Arguments::new(&[f64::from(n)]).unwrap();
                let value = calc::Evaluator::new(args).eval(expression).unwrap();
                let expected = if n >= 0 && f64::from(n).sin().abs() >= 1e-6 {
                    f64::from(n).sin()
                } else {
                    f64::from(n).abs()
                };
                assert_eq!(value, expected);
            });
        }
    });
}
