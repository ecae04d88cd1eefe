use std::io::Write;

use converter::printer::{self, Printer};
use converter::{
    ConvertError, GenerateError, Generator, Options, PowerRelation, Strategy, power,
    power_relation, universal,
};
use nsc::digits::{DigitSequence, StoreConfig};
use nsc::parser::Parser;
use nsc::{ErrorKind, Job};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SYMBOLS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn run_with(input: &str, options: &Options) -> Result<String, ConvertError> {
    converter::convert_str(input, options)
}

fn run(input: &str) -> String {
    run_with(input, &Options::default()).expect("conversion failed")
}

fn run_universal(input: &str) -> String {
    let options = Options {
        strategy: Strategy::Universal,
        ..Options::default()
    };
    run_with(input, &options).expect("conversion failed")
}

fn small_blocks(capacity: usize) -> Options {
    Options {
        store: StoreConfig::with_block_capacity(capacity),
        ..Options::default()
    }
}

fn job(digits: &str, base_in: u8, base_out: u8, capacity: usize) -> Job {
    let input = format!("[{}]{}={}", digits, base_in, base_out);
    Parser::new(input.as_bytes())
        .with_store_config(StoreConfig::with_block_capacity(capacity))
        .parse()
        .expect("parse failed")
}

fn random_digits(rng: &mut StdRng, base: u8, len: usize) -> String {
    let mut digits = String::with_capacity(len);
    digits.push(SYMBOLS[rng.gen_range(1..base) as usize] as char);
    for _ in 1..len {
        digits.push(SYMBOLS[rng.gen_range(0..base) as usize] as char);
    }
    digits
}

/// The digit list of a printed `[digits]base` line.
fn digits_of(line: &str) -> &str {
    let close = line.find(']').expect("no closing bracket");
    &line[1..close]
}

#[test]
fn power_relation_detection() {
    assert_eq!(power_relation(2, 8), Some(PowerRelation::Group { exponent: 3 }));
    assert_eq!(power_relation(8, 2), Some(PowerRelation::Split { exponent: 3 }));
    assert_eq!(power_relation(6, 36), Some(PowerRelation::Group { exponent: 2 }));
    assert_eq!(power_relation(2, 32), Some(PowerRelation::Group { exponent: 5 }));
    assert_eq!(power_relation(10, 10), Some(PowerRelation::Group { exponent: 1 }));
    assert_eq!(power_relation(4, 32), None);
    assert_eq!(power_relation(8, 16), None);
    assert_eq!(power_relation(10, 2), None);
}

#[test]
fn known_conversions() {
    assert_eq!(run("[777]8=2\n"), "[111111111]2\n");
    assert_eq!(run("[11111111]2=16\n"), "[FF]16\n");
    assert_eq!(run("[1012222121310101]4=32\n"), "[13AJ78H]32\n");
    assert_eq!(run("[123456789]10=36\n"), "[21I3V9]36\n");
    assert_eq!(run("[HELLOWORLD]36=10\n"), "[1767707668033969]10\n");
    assert_eq!(
        run("[9999999999999999999999999999]10=7\n"),
        "[1202445236620665312261012043046523]7\n"
    );
}

#[test]
fn boundary_bases() {
    assert_eq!(run("[Z]36=2"), "[100011]2\n");
    assert_eq!(run("[ZZ]36=10"), "[1295]10\n");
    assert_eq!(run("[100011]2=36"), "[Z]36\n");
    assert_eq!(run("[1]2=36"), "[1]36\n");
    assert_eq!(run(&format!("[{}]2=10", "1".repeat(64))), "[18446744073709551615]10\n");
}

#[test]
fn zero_canonicalization() {
    assert_eq!(run("[0000]8=16"), "[0]16\n");
    assert_eq!(run("[0]36=2"), "[0]2\n");
    assert_eq!(run("[000]2=8"), "[0]8\n");
    assert_eq!(run("[0]8=2"), "[0]2\n");
    assert_eq!(run_universal("[0000]8=16"), "[0]16\n");
}

#[test]
fn leading_zeros_from_splitting_are_stripped() {
    assert_eq!(run("[1]16=2"), "[1]2\n");
    assert_eq!(run("[1F]16=4"), "[133]4\n");
}

#[test]
fn short_leading_group() {
    assert_eq!(run("[12012]3=9"), "[165]9\n");
    assert_eq!(run("[1000000001]2=8"), "[1001]8\n");
}

#[test]
fn identity_keeps_digits() {
    for base in 2..=36u8 {
        let digit = SYMBOLS[(base - 1) as usize] as char;
        let input = format!("[00{}0{}]{}={}", digit, digit, base, base);
        assert_eq!(run(&input), format!("[{}0{}]{}\n", digit, digit, base));
    }
}

#[test]
fn power_and_universal_paths_agree() {
    let mut rng = StdRng::seed_from_u64(7);
    for (base_in, base_out) in [(8, 2), (2, 8), (2, 16), (16, 2), (4, 16), (3, 27), (36, 6), (2, 32), (5, 25), (7, 7)] {
        for len in [1, 2, 5, 17, 64] {
            let digits = random_digits(&mut rng, base_in, len);
            let input = format!("[{}]{}={}", digits, base_in, base_out);
            assert_eq!(run(&input), run_universal(&input), "{}", input);
        }
    }
}

#[test]
fn converters_agree_when_called_directly() {
    let relation = power_relation(8, 2).expect("8 is a power of 2");
    let by_power = power::convert(job("777", 8, 2, 2), relation).unwrap();
    let by_universal = universal::convert(job("777", 8, 2, 2)).unwrap();
    assert_eq!(by_power.digits.to_vec(), by_universal.digits.to_vec());
    assert_eq!(by_power.digits.to_symbols(), "111111111");
    assert_eq!(by_power.base_out, 2);
}

#[test]
fn round_trip_all_base_pairs() {
    let mut rng = StdRng::seed_from_u64(2011);
    for base_in in 2..=36u8 {
        for base_out in 2..=36u8 {
            let len = rng.gen_range(1..40);
            let digits = random_digits(&mut rng, base_in, len);
            let options = small_blocks(rng.gen_range(1..8));

            let there = run_with(&format!("[{}]{}={}", digits, base_in, base_out), &options)
                .expect("forward conversion failed");
            let back = run_with(&format!("[{}]{}={}", digits_of(&there), base_out, base_in), &options)
                .expect("backward conversion failed");
            assert_eq!(
                back,
                format!("[{}]{}\n", digits, base_in),
                "{} -> {} -> {}",
                base_in,
                base_out,
                base_in
            );
        }
    }
}

#[test]
fn long_number_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    let digits = random_digits(&mut rng, 10, 2_000);
    let options = small_blocks(16);
    let there = run_with(&format!("[{}]10=7", digits), &options).unwrap();
    let back = run_with(&format!("[{}]7=10", digits_of(&there)), &options).unwrap();
    assert_eq!(digits_of(&back), digits);
}

#[test]
fn errors_map_to_kinds_and_write_nothing() {
    let cases = [
        ("777]8=2", ErrorKind::MalformedInput),
        ("[777", ErrorKind::MalformedInput),
        ("[777]82", ErrorKind::MalformedInput),
        ("[1]37=2", ErrorKind::InputBaseOutOfRange),
        ("[1]10=37", ErrorKind::OutputBaseOutOfRange),
        ("[19]8=2", ErrorKind::InvalidDigitForBase),
    ];
    for (input, kind) in cases {
        let mut out = Vec::new();
        let err = converter::execute(input.as_bytes(), &mut out, &Options::default())
            .expect_err(input);
        assert_eq!(err.kind(), kind, "{}", input);
        assert_eq!(err.exit_code(), kind.ordinal());
        assert!(out.is_empty(), "{} wrote {:?}", input, out);
    }
}

#[test]
fn exit_codes_follow_kind_order() {
    let codes: Vec<i32> = ErrorKind::ALL.iter().map(|k| k.ordinal()).collect();
    assert_eq!(codes, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(ErrorKind::from_name("MalformedInput"), Some(ErrorKind::MalformedInput));
    assert_eq!(ErrorKind::from_name("malformed"), None);
    assert!(ErrorKind::Unknown.message().starts_with("ERROR!"));
}

#[test]
fn diagnostic_carries_code_and_detail() {
    let err = run_with("[1]40=2", &Options::default()).unwrap_err();
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("E04"));
    assert_eq!(diagnostic.message, ErrorKind::InputBaseOutOfRange.message());
    assert!(diagnostic.notes.iter().any(|n| n.contains("40")));
}

#[test]
fn output_growth_beyond_block_limit_is_out_of_memory() {
    // Three digits fit the input in one block; base 2 output needs 9 digits.
    let options = Options {
        store: StoreConfig {
            block_capacity: 4,
            max_blocks: Some(2),
        },
        ..Options::default()
    };
    let err = run_with("[777]8=2", &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);

    let universal_options = Options {
        strategy: Strategy::Universal,
        ..options
    };
    let err = run_with("[777]8=2", &universal_options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);

    assert_eq!(run_with("[777]8=16", &options).unwrap(), "[1FF]16\n");
}

#[test]
fn printer_releases_one_block_per_step() {
    let mut digits =
        DigitSequence::from_digits(StoreConfig::with_block_capacity(3), &[1, 0, 35, 4, 5, 6, 7])
            .unwrap();
    let total = digits.live_blocks();
    assert_eq!(total, 3);

    let mut printer = Printer::new(Vec::new());
    let mut steps = 0;
    while printer.emit_block(&mut digits).unwrap() {
        steps += 1;
        assert_eq!(digits.live_blocks(), total - steps);
        assert!(printer.scratch_capacity() <= 3);
    }
    assert_eq!(steps, total);
    assert!(digits.is_empty());
    assert!(digits.peak_blocks() <= total);

    let out = printer.finish(36).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "[10Z4567]36\n");
}

#[test]
fn printer_memory_is_independent_of_length() {
    for len in [10usize, 1_000, 10_000] {
        let digits = DigitSequence::from_digits(StoreConfig::with_block_capacity(8), &vec![9u8; len])
            .unwrap();
        let mut printer = Printer::new(std::io::sink());
        let mut digits = digits;
        while printer.emit_block(&mut digits).unwrap() {
            assert!(printer.scratch_capacity() <= 8);
        }
        assert_eq!(digits.live_blocks(), 0);
    }
}

#[test]
fn print_consumes_job() {
    let job = job("00FF", 16, 16, 1);
    let out = printer::print(job, Vec::new()).unwrap();
    assert_eq!(out, b"[FF]16\n");
}

#[test]
fn generator_output_is_well_formed() {
    let generator = Generator::new(16, 3, 500).unwrap();
    let mut out = Vec::new();
    generator
        .write_to(&mut out, &mut StdRng::seed_from_u64(1))
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with("]16=3\n"), "{}", text);
    let digits = digits_of(&text);
    assert_eq!(digits.len(), 500);
    assert_ne!(digits.as_bytes()[0], b'0');
    assert!(digits.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_lowercase()));

    // A generated request converts and round-trips.
    let there = run(&text);
    let back = run(&format!("[{}]3=16", digits_of(&there)));
    assert_eq!(digits_of(&back), digits);
}

#[test]
fn generator_is_reproducible_with_a_seed() {
    let generator = Generator::new(36, 2, 64).unwrap();
    let mut first = Vec::new();
    let mut second = Vec::new();
    generator.write_to(&mut first, &mut StdRng::seed_from_u64(9)).unwrap();
    generator.write_to(&mut second, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn generator_rejects_bad_parameters() {
    assert!(matches!(Generator::new(1, 10, 5), Err(GenerateError::BaseOutOfRange(1))));
    assert!(matches!(Generator::new(10, 37, 5), Err(GenerateError::BaseOutOfRange(37))));
    let err = Generator::new(10, 2, 0).unwrap_err();
    assert!(matches!(err, GenerateError::EmptyNumber));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(err.message(), "ERROR! Bad parameters.");
}

#[test]
fn generated_file_converts_through_a_file_reader() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("request.txt");

    let mut file = std::fs::File::create(&path).unwrap();
    Generator::new(2, 10, 3_000)
        .unwrap()
        .write_to(&mut file, &mut StdRng::seed_from_u64(3))
        .unwrap();
    file.flush().unwrap();

    let options = Options {
        store: StoreConfig::with_block_capacity(64),
        chunk_size: 100,
        ..Options::default()
    };
    let by_file = converter::execute(std::fs::File::open(&path).unwrap(), Vec::new(), &options)
        .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let in_memory = run(&text);
    assert_eq!(String::from_utf8(by_file).unwrap(), in_memory);

    // Binary to octal goes through the power path; check it against the universal path too.
    let octal = format!("[{}]2=8", digits_of(&text));
    assert_eq!(run(&octal), run_universal(&octal));
}
