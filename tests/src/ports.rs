use crate::init_log;

use emu_lib::io::console::{ConsolePort, PipeConsole};
use emu_lib::io::timer::Timer;
use emu_lib::io::PortReg;
use emu_lib::ports::{Devices, PortTarget};
use emu_lib::{InterruptController, PortDispatcher, PortError, Profile};

use std::sync::Arc;

const TIMER_DATA: u16 = 0x00;
const TIMER_CTRL: u16 = 0x06;
const INT_CTRL: u16 = 0x18;
const INT_DATA: u16 = 0x1A;
const CON_CTRL: u16 = 0x20;
const CON_DATA: u16 = 0x22;
const DELAY: u16 = 0x80;

fn solo86() -> (PortDispatcher, Devices, Arc<PipeConsole>) {
    let profile = Profile::solo86().with_timer_max(4);
    let tty = Arc::new(PipeConsole::default());
    let devs = Devices {
        pic: InterruptController::new(&profile.lines),
        timer: Timer::new(profile.timer_line, profile.timer_max, profile.timer_enabled),
        console: ConsolePort::new(tty.clone()),
    };
    (PortDispatcher::new(profile.ports), devs, tty)
}

#[test]
fn solo86_map() {
    let (ports, _, _) = solo86();
    let map = ports.map();
    assert_eq!(map.route(TIMER_DATA), Some(PortTarget::Timer(PortReg::Data)));
    assert_eq!(map.route(TIMER_CTRL), Some(PortTarget::Timer(PortReg::Ctrl)));
    assert_eq!(map.route(INT_CTRL), Some(PortTarget::Int(PortReg::Ctrl)));
    assert_eq!(map.route(INT_DATA), Some(PortTarget::Int(PortReg::Data)));
    assert_eq!(map.route(CON_CTRL), Some(PortTarget::Console(PortReg::Ctrl)));
    assert_eq!(map.route(CON_DATA), Some(PortTarget::Console(PortReg::Data)));
    assert_eq!(map.route(DELAY), Some(PortTarget::Delay));
    assert_eq!(map.route(0x21), None);
}

#[test]
#[should_panic]
fn duplicate_port() {
    emu_lib::PortMap::new((0x06, 0x00), (0x18, 0x1A), (0x20, 0x06), 0x80);
}

#[test]
fn unmapped_byte_ports() {
    init_log();
    let (ports, mut devs, tty) = solo86();
    for port in [0x01, 0x21, 0x3f8, 0xffff] {
        assert_eq!(ports.read_byte(&mut devs, port), 0xff);
        ports.write_byte(&mut devs, port, 0x30);
    }
    assert!(devs.timer.is_enabled());
    assert!(!tty.has_output());
    assert_eq!(devs.pic.highest_pending(), None);
}

#[test]
fn delay_port_absorbs() {
    let (ports, mut devs, tty) = solo86();
    ports.write_byte(&mut devs, DELAY, 0x30);
    assert_eq!(ports.read_byte(&mut devs, DELAY), 0xff);
    assert_eq!(ports.read_word(&mut devs, DELAY), Ok(0xffff));
    assert!(devs.timer.is_enabled());
    assert!(!tty.has_output());
}

#[test]
fn timer_control_port() {
    let (ports, mut devs, _) = solo86();
    ports.write_byte(&mut devs, TIMER_CTRL, 0x30);
    assert!(!devs.timer.is_enabled());
    for _ in 0..16 {
        devs.timer.tick(&mut devs.pic);
    }
    assert_eq!(devs.pic.highest_pending(), None);

    ports.write_byte(&mut devs, TIMER_CTRL, 0x34);
    assert!(devs.timer.is_enabled());

    // Data port is not a control port.
    ports.write_byte(&mut devs, TIMER_DATA, 0x30);
    assert!(devs.timer.is_enabled());
    assert_eq!(ports.read_byte(&mut devs, TIMER_CTRL), 0xff);
}

#[test]
fn int_data_write_ends_service() {
    let (ports, mut devs, _) = solo86();
    devs.pic.set_line(0, true);
    devs.pic.acknowledge(0);
    assert!(devs.pic.is_in_service(0));

    // Control port is reserved.
    ports.write_byte(&mut devs, INT_CTRL, 0x20);
    assert!(devs.pic.is_in_service(0));

    ports.write_byte(&mut devs, INT_DATA, 0x20);
    assert!(!devs.pic.is_in_service(0));
}

#[test]
fn int_data_word_write_ends_service() {
    let (ports, mut devs, _) = solo86();
    devs.pic.set_line(0, true);
    devs.pic.acknowledge(0);
    ports.write_word(&mut devs, INT_DATA, 0x0020).unwrap();
    assert!(!devs.pic.is_in_service(0));
}

#[test]
fn console_output() {
    let (ports, mut devs, tty) = solo86();
    for ch in b"hi\n" {
        ports.write_byte(&mut devs, CON_DATA, *ch);
    }
    ports.write_byte(&mut devs, CON_CTRL, b'x');

    assert_eq!(tty.take_output(), "hi\n");
}

#[test]
fn console_input() {
    let (ports, mut devs, _) = solo86();
    assert_eq!(ports.read_byte(&mut devs, CON_CTRL), 0);
    assert_eq!(ports.read_byte(&mut devs, CON_DATA), 0);

    devs.console.enqueue_key('A' as u32);
    devs.console.enqueue_key('B' as u32);
    devs.console.enqueue_key('\r' as u32);

    assert_eq!(ports.read_byte(&mut devs, CON_CTRL), 1);
    assert_eq!(ports.read_byte(&mut devs, CON_DATA), b'A');
    assert_eq!(ports.read_byte(&mut devs, CON_DATA), b'B');
    assert_eq!(ports.read_byte(&mut devs, CON_DATA), b'\n');
    assert_eq!(ports.read_byte(&mut devs, CON_CTRL), 0);
}

#[test]
fn odd_word_ports_rejected() {
    init_log();
    let (ports, mut devs, tty) = solo86();
    devs.console.enqueue_key('k' as u32);
    devs.pic.set_line(0, true);
    devs.pic.acknowledge(0);

    for port in [0x01, 0x07, 0x1B, 0x21, 0x23, 0x81] {
        assert_eq!(ports.read_word(&mut devs, port), Err(PortError::Misaligned { port }));
        assert_eq!(ports.write_word(&mut devs, port, 0x0030), Err(PortError::Misaligned { port }));
    }

    assert!(devs.timer.is_enabled());
    assert!(devs.console.poll_key());
    assert!(devs.pic.is_in_service(0));
    assert!(!tty.has_output());
}

#[test]
fn unmapped_word_ports() {
    let (ports, mut devs, _) = solo86();
    assert_eq!(ports.read_word(&mut devs, 0x40), Ok(0xffff));
    assert_eq!(ports.write_word(&mut devs, 0x40, 0x1234), Ok(()));
}

#[test]
fn mapped_word_reads() {
    let (ports, mut devs, tty) = solo86();
    devs.console.enqueue_key('z' as u32);
    assert_eq!(ports.read_word(&mut devs, CON_CTRL), Ok(0x0001));
    assert_eq!(ports.read_word(&mut devs, CON_DATA), Ok('z' as u16));

    ports.write_word(&mut devs, CON_DATA, 0x4142).unwrap();
    assert_eq!(tty.take_output(), "B");
    assert_eq!(ports.read_word(&mut devs, TIMER_DATA), Ok(0x00ff));
}

#[test]
fn pcxtat_map() {
    let profile = Profile::pcxtat();
    // EOI on 20h, mask register on 21h.
    assert_eq!(profile.ports.route(0x20), Some(PortTarget::Int(PortReg::Data)));
    assert_eq!(profile.ports.route(0x21), Some(PortTarget::Int(PortReg::Ctrl)));
    assert_eq!(profile.ports.route(0x43), Some(PortTarget::Timer(PortReg::Ctrl)));
    assert_eq!(profile.ports.route(0x3F8), Some(PortTarget::Console(PortReg::Data)));
    assert_eq!(profile.ports.route(0x22), None);
}
