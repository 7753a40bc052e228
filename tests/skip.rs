use dcpu16::{assemble, CpuConfig, Dcpu, Engine, Step};
use pretty_assertions::assert_eq;

fn boot(src: &str) -> Dcpu {
    let mut dcpu = Dcpu::new(CpuConfig { clock: false, ..CpuConfig::default() });
    dcpu.load(&assemble(src).unwrap());
    dcpu
}

#[test]
fn failed_test_skips_one_instruction() {
    let mut dcpu = boot("IFE A, 1\nSET B, 1\nSET C, 2");
    assert_eq!(dcpu.step(), Step::Executed);
    assert_eq!(dcpu.cpu().cycle, 3);
    assert!(dcpu.cpu().skipping());

    assert_eq!(dcpu.step(), Step::Skipped);
    assert_eq!(dcpu.cpu().reg[1], 0);
    assert_eq!(dcpu.cpu().cycle, 3);
    assert!(!dcpu.cpu().skipping());

    dcpu.step();
    assert_eq!(dcpu.cpu().reg[2], 2);
    assert_eq!(dcpu.cpu().cycle, 4);
}

#[test]
fn passing_test_runs_the_next_instruction() {
    let mut dcpu = boot("IFN A, 1\nSET B, 1");
    dcpu.step();
    assert_eq!(dcpu.cpu().cycle, 2);
    assert_eq!(dcpu.step(), Step::Executed);
    assert_eq!(dcpu.cpu().reg[1], 1);
}

#[test]
fn skipped_conditionals_chain() {
    let mut dcpu = boot("IFE A, 1\nIFE B, 0x30\nSET C, 0x40\nSET X, 1");
    dcpu.step();
    assert_eq!(dcpu.cpu().cycle, 3);

    // the chained test costs one cycle and its trailing word is free
    assert_eq!(dcpu.step(), Step::Skipped);
    assert_eq!(dcpu.cpu().pc, 3);
    assert_eq!(dcpu.cpu().cycle, 4);
    assert!(dcpu.cpu().skipping());

    assert_eq!(dcpu.step(), Step::Skipped);
    assert_eq!(dcpu.cpu().pc, 5);
    assert_eq!(dcpu.cpu().cycle, 4);
    assert_eq!(dcpu.cpu().reg[2], 0);

    assert_eq!(dcpu.step(), Step::Executed);
    assert_eq!(dcpu.cpu().reg[3], 1);
    assert_eq!(dcpu.cpu().cycle, 5);
}

#[test]
fn skipped_stack_operands_leave_sp_alone() {
    let mut dcpu = boot("IFE A, 1\nSET PUSH, POP\nSET B, 1");
    dcpu.n_steps(2);
    assert_eq!(dcpu.cpu().sp, 0);
    assert_eq!(dcpu.cpu().pc, 2);
}

#[test]
fn skipped_special_instruction() {
    let mut dcpu = boot("IFE A, 1\nJSR 0x1000\nSET B, 1");
    dcpu.n_steps(3);
    let cpu = dcpu.cpu();
    assert_eq!((cpu.pc, cpu.sp, cpu.reg[1]), (4, 0, 1));
}

fn passes(a: u16, test: &str, b: u16) -> bool {
    let src = format!("SET A, {a}\nSET B, {b}\n{test} A, B\nSET C, 1");
    let mut dcpu = boot(&src);
    dcpu.n_steps(4);
    dcpu.cpu().reg[2] == 1
}

#[test]
fn conditional_table() {
    assert!(passes(0b0110, "IFB", 0b0100));
    assert!(!passes(0b0110, "IFB", 0b1001));
    assert!(passes(0b0110, "IFC", 0b1001));
    assert!(!passes(0b0110, "IFC", 0b0010));
    assert!(passes(7, "IFE", 7));
    assert!(!passes(7, "IFN", 7));
    assert!(passes(0xffff, "IFG", 1));
    assert!(!passes(0xffff, "IFA", 1));
    assert!(passes(1, "IFA", 0xffff));
    assert!(passes(1, "IFL", 0xffff));
    assert!(passes(0xffff, "IFU", 1));
    assert!(!passes(1, "IFU", 0xffff));
}
