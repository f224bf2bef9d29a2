use log::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Level,
    Edge,
}

// Static wiring of one line, fixed for a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    pub trigger: Trigger,
    pub prio: u8, // 0 is highest
    pub vector: u8,
    pub masked: bool,
}

#[derive(Debug, Clone, Copy)]
struct Line {
    config: LineConfig,
    masked: bool,
    signal: bool, // Live input level
    requested: bool,
    in_service: bool,
}

impl Line {
    fn new(config: LineConfig) -> Self {
        Line {
            config,
            masked: config.masked,
            signal: false,
            requested: false,
            in_service: false,
        }
    }

    // Edge lines hold their latch; level lines follow the live signal.
    fn pending(&self) -> bool {
        match self.config.trigger {
            Trigger::Edge => self.requested,
            Trigger::Level => self.signal,
        }
    }
}

// Edge/level request latching with static priorities and fully nested service:
// a request is only actionable above the priority of every line in service.
pub struct InterruptController {
    lines: Vec<Line>,
}

impl InterruptController {
    pub fn new(configs: &[LineConfig]) -> Self {
        for (i, a) in configs.iter().enumerate() {
            for b in &configs[i + 1..] {
                assert_ne!(a.prio, b.prio, "Duplicate interrupt priority {}", a.prio);
            }
        }

        InterruptController {
            lines: configs.iter().copied().map(Line::new).collect(),
        }
    }

    pub fn reset(&mut self) {
        for line in self.lines.iter_mut() {
            *line = Line::new(line.config);
        }
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, line: usize) -> &Line {
        let num = self.lines.len();
        self.lines
            .get(line)
            .unwrap_or_else(|| panic!("No interrupt line {line} (have {num})"))
    }

    fn line_mut(&mut self, line: usize) -> &mut Line {
        let num = self.lines.len();
        self.lines
            .get_mut(line)
            .unwrap_or_else(|| panic!("No interrupt line {line} (have {num})"))
    }

    pub fn set_line(&mut self, line: usize, asserted: bool) {
        let l = self.line_mut(line);
        match l.config.trigger {
            Trigger::Edge => {
                if asserted && !l.signal && !l.requested {
                    trace!("Int: line {line} latched");
                    l.requested = true;
                }
            }
            Trigger::Level => (),
        }
        l.signal = asserted;
    }

    // Priority of the most important line in service, if any.
    fn service_prio(&self) -> Option<u8> {
        self.lines
            .iter()
            .filter(|l| l.in_service)
            .map(|l| l.config.prio)
            .min()
    }

    pub fn highest_pending(&self) -> Option<usize> {
        let ceiling = self.service_prio();
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.pending() && !l.masked)
            .filter(|(_, l)| ceiling.is_none_or(|prio| l.config.prio < prio))
            .min_by_key(|(_, l)| l.config.prio)
            .map(|(i, _)| i)
    }

    // Moves `line` into service and returns the vector to dispatch to.
    pub fn acknowledge(&mut self, line: usize) -> u8 {
        let l = self.line_mut(line);
        if !l.pending() {
            warn!("Int: acknowledge of line {line} with no request");
        }
        l.requested = false;
        l.in_service = true;
        debug!("Int: line {line} acknowledged, vector {:#04x}", l.config.vector);
        l.config.vector
    }

    // Non-specific EOI: retires the highest priority line in service.
    pub fn end_of_service(&mut self) {
        let Some((i, l)) = self
            .lines
            .iter_mut()
            .enumerate()
            .filter(|(_, l)| l.in_service)
            .min_by_key(|(_, l)| l.config.prio)
        else {
            trace!("Int: end of service with nothing in service");
            return;
        };
        l.in_service = false;
        debug!("Int: end of service for line {i}");
    }

    pub fn set_mask(&mut self, line: usize, masked: bool) {
        self.line_mut(line).masked = masked;
    }

    pub fn is_masked(&self, line: usize) -> bool {
        self.line(line).masked
    }

    pub fn is_pending(&self, line: usize) -> bool {
        self.line(line).pending()
    }

    pub fn is_in_service(&self, line: usize) -> bool {
        self.line(line).in_service
    }

    pub fn vector(&self, line: usize) -> u8 {
        self.line(line).config.vector
    }
}
