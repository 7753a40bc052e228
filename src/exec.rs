//! Opcode handlers. Each takes the resolved destination and the source
//! value and returns the cycles it costs on top of operand fetches.

use crate::cpu::{Cpu, Flags, Loc};
use crate::hardware::Device;

pub type BasicFn = fn(&mut Cpu, Loc, u16) -> u64;
pub type SpecialFn = fn(&mut Cpu, &mut [Box<dyn Device>], Loc) -> u64;

pub const JSR: u8 = 0x01;
pub const BRK: u8 = 0x02;

pub fn basic_handler(op: u8) -> Option<BasicFn> {
    let f: BasicFn = match op {
        0x01 => set,
        0x02 => add,
        0x03 => sub,
        0x04 => mul,
        0x05 => mli,
        0x06 => div,
        0x07 => dvi,
        0x08 => modu,
        0x09 => mdi,
        0x0a => and,
        0x0b => bor,
        0x0c => xor,
        0x0d => shr,
        0x0e => asr,
        0x0f => shl,
        0x10 => ifb,
        0x11 => ifc,
        0x12 => ife,
        0x13 => ifn,
        0x14 => ifg,
        0x15 => ifa,
        0x16 => ifl,
        0x17 => ifu,
        0x1a => adx,
        0x1b => sbx,
        0x1e => set_inc,
        0x1f => set_dec,
        _ => return None,
    };
    Some(f)
}

pub fn special_handler(op: u8) -> Option<SpecialFn> {
    let f: SpecialFn = match op {
        JSR => jsr,
        BRK => brk,
        0x08 => int,
        0x09 => iag,
        0x0a => ias,
        0x0b => rfi,
        0x0c => iaq,
        0x10 => hwn,
        0x11 => hwq,
        0x12 => hwi,
        _ => return None,
    };
    Some(f)
}

/// Runs a basic opcode. Unassigned opcodes cost one cycle and do nothing.
pub fn basic(cpu: &mut Cpu, op: u8, dst: Loc, src: u16) -> u64 {
    match basic_handler(op) {
        Some(f) => f(cpu, dst, src),
        None => {
            tracing::debug!(op, pc = cpu.pc, "unassigned basic opcode");
            1
        }
    }
}

pub fn special(cpu: &mut Cpu, devices: &mut [Box<dyn Device>], op: u8, a: Loc) -> u64 {
    match special_handler(op) {
        Some(f) => f(cpu, devices, a),
        None => {
            tracing::debug!(op, pc = cpu.pc, "unassigned special opcode");
            1
        }
    }
}

fn signed(v: u16) -> i64 {
    v as i16 as i64
}

fn set(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    cpu.write(dst, src);
    1
}

fn add(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let (res, carry) = cpu.read(dst).overflowing_add(src);
    cpu.write(dst, res);
    cpu.ex = carry as u16;
    2
}

fn sub(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let (res, borrow) = cpu.read(dst).overflowing_sub(src);
    cpu.write(dst, res);
    cpu.ex = if borrow { 0xffff } else { 0 };
    2
}

fn mul(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let p = cpu.read(dst) as u32 * src as u32;
    cpu.write(dst, p as u16);
    cpu.ex = (p >> 16) as u16;
    2
}

fn mli(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let p = signed(cpu.read(dst)) * signed(src);
    cpu.write(dst, p as u16);
    cpu.ex = (p >> 16) as u16;
    2
}

fn div(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let a = cpu.read(dst) as u32;
    let b = src as u32;
    let (res, ex) = if b == 0 { (0, 0) } else { (a / b, (a << 16) / b) };
    cpu.write(dst, res as u16);
    cpu.ex = ex as u16;
    3
}

fn dvi(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let a = signed(cpu.read(dst));
    let b = signed(src);
    let (res, ex) = if b == 0 { (0, 0) } else { (a / b, (a << 16) / b) };
    cpu.write(dst, res as u16);
    cpu.ex = ex as u16;
    3
}

fn modu(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let a = cpu.read(dst);
    cpu.write(dst, if src == 0 { 0 } else { a % src });
    3
}

fn mdi(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let a = signed(cpu.read(dst));
    let b = signed(src);
    cpu.write(dst, if b == 0 { 0 } else { (a % b) as u16 });
    3
}

fn and(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let v = cpu.read(dst) & src;
    cpu.write(dst, v);
    1
}

fn bor(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let v = cpu.read(dst) | src;
    cpu.write(dst, v);
    1
}

fn xor(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let v = cpu.read(dst) ^ src;
    cpu.write(dst, v);
    1
}

// Shift counts above 63 behave like 63: every bit is gone either way.
fn shr(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let a = cpu.read(dst) as u64;
    let n = (src as u32).min(63);
    cpu.write(dst, (a >> n) as u16);
    cpu.ex = ((a << 16) >> n) as u16;
    2
}

fn asr(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let a = signed(cpu.read(dst));
    let n = (src as u32).min(63);
    cpu.write(dst, (a >> n) as u16);
    cpu.ex = ((a << 16) >> n) as u16;
    2
}

fn shl(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let a = cpu.read(dst) as u64;
    let p = a << (src as u32).min(63);
    cpu.write(dst, p as u16);
    cpu.ex = (p >> 16) as u16;
    2
}

/// Arms the skip flag when the test fails; failing costs one extra cycle.
fn branch(cpu: &mut Cpu, pass: bool) -> u64 {
    if pass {
        2
    } else {
        cpu.flags.insert(Flags::SKIP);
        3
    }
}

fn ifb(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = cpu.read(dst) & src != 0;
    branch(cpu, pass)
}

fn ifc(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = cpu.read(dst) & src == 0;
    branch(cpu, pass)
}

fn ife(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = cpu.read(dst) == src;
    branch(cpu, pass)
}

fn ifn(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = cpu.read(dst) != src;
    branch(cpu, pass)
}

fn ifg(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = cpu.read(dst) > src;
    branch(cpu, pass)
}

fn ifa(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = signed(cpu.read(dst)) > signed(src);
    branch(cpu, pass)
}

fn ifl(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = cpu.read(dst) < src;
    branch(cpu, pass)
}

fn ifu(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let pass = signed(cpu.read(dst)) < signed(src);
    branch(cpu, pass)
}

fn adx(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let s = cpu.read(dst) as u32 + src as u32 + cpu.ex as u32;
    cpu.write(dst, s as u16);
    cpu.ex = (s > 0xffff) as u16;
    3
}

fn sbx(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    let s = cpu.read(dst) as i32 - src as i32 + cpu.ex as i32;
    cpu.write(dst, s as u16);
    cpu.ex = if (0..=0xffff).contains(&s) { 0 } else { 0xffff };
    3
}

fn set_inc(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    cpu.write(dst, src);
    cpu.reg[6] = cpu.reg[6].wrapping_add(1);
    cpu.reg[7] = cpu.reg[7].wrapping_add(1);
    2
}

fn set_dec(cpu: &mut Cpu, dst: Loc, src: u16) -> u64 {
    cpu.write(dst, src);
    cpu.reg[6] = cpu.reg[6].wrapping_sub(1);
    cpu.reg[7] = cpu.reg[7].wrapping_sub(1);
    2
}

fn jsr(cpu: &mut Cpu, _: &mut [Box<dyn Device>], a: Loc) -> u64 {
    let target = cpu.read(a);
    cpu.push(cpu.pc);
    cpu.pc = target;
    3
}

fn brk(_: &mut Cpu, _: &mut [Box<dyn Device>], _: Loc) -> u64 {
    1
}

fn int(cpu: &mut Cpu, _: &mut [Box<dyn Device>], a: Loc) -> u64 {
    let message = cpu.read(a);
    cpu.interrupt(message);
    4
}

fn iag(cpu: &mut Cpu, _: &mut [Box<dyn Device>], a: Loc) -> u64 {
    cpu.write(a, cpu.ia);
    1
}

fn ias(cpu: &mut Cpu, _: &mut [Box<dyn Device>], a: Loc) -> u64 {
    cpu.ia = cpu.read(a);
    1
}

fn rfi(cpu: &mut Cpu, _: &mut [Box<dyn Device>], _: Loc) -> u64 {
    cpu.flags.remove(Flags::QUEUEING);
    cpu.reg[0] = cpu.pop();
    cpu.pc = cpu.pop();
    3
}

fn iaq(cpu: &mut Cpu, _: &mut [Box<dyn Device>], a: Loc) -> u64 {
    let on = cpu.read(a) != 0;
    cpu.flags.set(Flags::QUEUEING, on);
    2
}

fn hwn(cpu: &mut Cpu, devices: &mut [Box<dyn Device>], a: Loc) -> u64 {
    cpu.write(a, devices.len() as u16);
    2
}

fn hwq(cpu: &mut Cpu, devices: &mut [Box<dyn Device>], a: Loc) -> u64 {
    if let Some(dev) = devices.get(cpu.read(a) as usize) {
        let (id, man) = (dev.id(), dev.manufacturer());
        cpu.reg[0] = id as u16;
        cpu.reg[1] = (id >> 16) as u16;
        cpu.reg[2] = dev.version();
        cpu.reg[3] = man as u16;
        cpu.reg[4] = (man >> 16) as u16;
    }
    4
}

fn hwi(cpu: &mut Cpu, devices: &mut [Box<dyn Device>], a: Loc) -> u64 {
    let extra = match devices.get_mut(cpu.read(a) as usize) {
        Some(dev) => dev.interrupt(cpu),
        None => 0,
    };
    4 + extra
}
