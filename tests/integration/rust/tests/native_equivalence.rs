//! Native Equivalence Integration Tests
//!
//! Both native backends must write byte-identical output to the bytecode
//! executor and leave the same tape. Generated code writes straight to file
//! descriptors, so output goes through temporary files.

#![cfg(all(target_arch = "x86_64", target_os = "linux"))]

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;

use bytecode_system::CompileOptions;
use core_types::{ErrorKind, RawProgram};
use integration_tests::{programs, run_bytecode, Outcome};
use interpreter::MemoryTape;
use jit_compiler::{CraneliftJit, IoFds, TemplateJit};

fn run_native(backend: &str, source: &str, input: &[u8], options: CompileOptions) -> Outcome {
    let mut input_file: File = tempfile::tempfile().unwrap();
    input_file.write_all(input).unwrap();
    input_file.seek(SeekFrom::Start(0)).unwrap();
    let mut output_file: File = tempfile::tempfile().unwrap();
    let fds = IoFds::new(input_file.as_raw_fd(), output_file.as_raw_fd());

    let program = RawProgram::from_source(source);
    let mut tape = MemoryTape::new();
    let result = match backend {
        "template-jit" => TemplateJit::new(options)
            .with_fds(fds)
            .run(&program, &mut tape),
        "cranelift-jit" => CraneliftJit::new(options)
            .with_fds(fds)
            .run(&program, &mut tape),
        other => panic!("unknown backend {}", other),
    };

    let mut output = Vec::new();
    output_file.seek(SeekFrom::Start(0)).unwrap();
    output_file.read_to_end(&mut output).unwrap();
    Outcome {
        output,
        tape,
        result: result.map(|_| ()),
    }
}

const BACKENDS: [&str; 2] = ["template-jit", "cranelift-jit"];

/// Test: Native output is byte-identical to the bytecode executor
#[test]
fn test_native_matches_bytecode() {
    for (name, source, input) in programs::TERMINATING {
        let reference = run_bytecode(source, input, &CompileOptions::default());
        reference.result.unwrap();

        for backend in BACKENDS {
            let native = run_native(backend, source, input, CompileOptions::default());
            assert!(native.result.is_ok(), "{} failed under {}", name, backend);
            assert_eq!(native.output, reference.output, "{} under {}", name, backend);
            assert_eq!(native.tape, reference.tape, "{} under {}", name, backend);
        }
    }
}

/// Test: Native code compiled without specialization behaves the same
#[test]
fn test_native_unspecialized_matches() {
    for backend in BACKENDS {
        let native = run_native(
            backend,
            programs::HELLO_WORLD,
            b"",
            CompileOptions::unspecialized(),
        );
        native.result.unwrap();
        assert_eq!(native.output, b"Hello World!\n");
    }
}

/// Test: Native code fails fast where the interpreters do
#[test]
fn test_native_out_of_range_matches() {
    for backend in BACKENDS {
        let native = run_native(
            backend,
            programs::FALLS_OFF_LEFT,
            b"",
            CompileOptions::default(),
        );
        let err = native.result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRangeTapeAccess);
        assert_eq!(native.output, b"A");
    }
}
