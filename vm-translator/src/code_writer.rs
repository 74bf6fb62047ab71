//! Emits Hack assembly for VM commands.
//!
//! The writer is generic over [`std::io::Write`], so translation renders
//! into an in-memory buffer and nothing touches the filesystem until the
//! whole program has translated.
//!
//! Label discipline: comparison expansions are suffixed
//! `<counter>.<filename>`, flow-control labels are qualified
//! `<File>.<CurrentFunction>$<label>`, and call return labels are
//! `<File>.<callee>$returnAddress.<counter>`. Both counters only ever grow,
//! which keeps every generated label unique across a whole directory
//! translation.

use std::io::Write;

use crate::error::VmError;

// Writes a block of fixed assembly lines.
macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl Segment {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "temp" => Some(Self::Temp),
            "pointer" => Some(Self::Pointer),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            _ => None,
        }
    }

    /// The `@` operand addressing the segment base. Indirect segments name
    /// a pointer register; `temp` and `pointer` name their fixed RAM base.
    fn base(self) -> &'static str {
        match self {
            Self::Local => "LCL",
            Self::Argument => "ARG",
            Self::This => "THIS",
            Self::That => "THAT",
            Self::Temp => "5",
            Self::Pointer => "3",
            Self::Static | Self::Constant => unreachable!("segment has no base register"),
        }
    }

    /// Whether the base register holds a pointer to the segment (true) or
    /// is the segment's first cell itself (false).
    fn is_indirect(self) -> bool {
        matches!(self, Self::Local | Self::Argument | Self::This | Self::That)
    }
}

pub struct CodeWriter<W: Write> {
    out: W,
    filename: String,
    current_function: String,
    cmp_counter: usize,
    call_counter: usize,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            filename: String::from("Bootstrap"),
            current_function: String::new(),
            cmp_counter: 0,
            call_counter: 0,
        }
    }

    /// Announces that commands from a new `.vm` file follow. The name
    /// qualifies static references and generated labels.
    pub fn set_file_name(&mut self, filename: &str) {
        self.filename.clear();
        self.filename.push_str(filename);
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Emits the program prologue for directory translations: point SP at
    /// 256 and transfer control to `Sys.init`.
    pub fn write_bootstrap(&mut self) -> Result<(), VmError> {
        write_asm!(self.out,
            "// bootstrap"
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)
    }

    pub fn write_arithmetic(&mut self, command: &str, line: usize) -> Result<(), VmError> {
        writeln!(self.out, "// {command}")?;

        match command {
            "add" => self.write_binary_op("M=M+D"),
            "sub" => self.write_binary_op("M=M-D"),
            "and" => self.write_binary_op("M=D&M"),
            "or" => self.write_binary_op("M=D|M"),
            "neg" => self.write_unary_op("M=-M"),
            "not" => self.write_unary_op("M=!M"),
            "shiftleft" => self.write_unary_op("M=M<<"),
            "shiftright" => self.write_unary_op("M=M>>"),
            "eq" => self.write_comparison("JEQ"),
            "gt" => self.write_comparison("JGT"),
            "lt" => self.write_comparison("JLT"),
            _ => Err(VmError::UnknownCommand {
                command: command.to_string(),
                line,
            }),
        }
    }

    /// Pops two operands, leaves `x <op> y` in the slot of `x`.
    fn write_binary_op(&mut self, operation: &str) -> Result<(), VmError> {
        write_asm!(self.out,
            "@SP"
            "A=M"
            "A=A-1"
            "D=M"
            "A=A-1"
        )?;
        writeln!(self.out, "{operation}")?;
        write_asm!(self.out,
            "@SP"
            "M=M-1"
        )?;
        Ok(())
    }

    /// Rewrites the stack top in place.
    fn write_unary_op(&mut self, operation: &str) -> Result<(), VmError> {
        write_asm!(self.out,
            "@SP"
            "A=M"
            "A=A-1"
        )?;
        writeln!(self.out, "{operation}")?;
        Ok(())
    }

    /// Overflow-safe comparison.
    ///
    /// `x - y` can overflow 16-bit two's complement when the operands have
    /// opposite signs, so the signs are examined first: opposite signs
    /// decide the outcome outright, and the subtraction only runs once the
    /// signs are known to agree. Pushes -1 for true, 0 for false.
    fn write_comparison(&mut self, jump: &str) -> Result<(), VmError> {
        // Results for the sign-mismatch arms: (x>=0,y<0) and (x<0,y>=0)
        let (pos_neg, neg_pos) = match jump {
            "JGT" => ("-1", "0"),
            "JLT" => ("0", "-1"),
            _ => ("0", "0"),
        };

        let suffix = format!("{}.{}", self.cmp_counter, self.filename);
        self.cmp_counter += 1;

        // y -> R14, x -> R13
        write_asm!(self.out,
            "@SP"
            "A=M"
            "A=A-1"
            "D=M"
            "@R14"
            "M=D"
            "@SP"
            "A=M"
            "A=A-1"
            "A=A-1"
            "D=M"
            "@R13"
            "M=D"
        )?;
        writeln!(
            self.out,
            "@X_POS{suffix}\nD;JGE\n@X_NEG{suffix}\n0;JMP"
        )?;
        writeln!(
            self.out,
            "(X_POS{suffix})\n@R14\nD=M\n@EQ_SIGN{suffix}\nD;JGE\n@X_POS_Y_NEG{suffix}\n0;JMP"
        )?;
        writeln!(
            self.out,
            "(X_NEG{suffix})\n@R14\nD=M\n@X_NEG_Y_POS{suffix}\nD;JGE\n@EQ_SIGN{suffix}\n0;JMP"
        )?;
        writeln!(
            self.out,
            "(X_POS_Y_NEG{suffix})\n@SP\nM=M-1\nA=M\nA=A-1\nM={pos_neg}\n@ENDCMP{suffix}\n0;JMP"
        )?;
        writeln!(
            self.out,
            "(X_NEG_Y_POS{suffix})\n@SP\nM=M-1\nA=M\nA=A-1\nM={neg_pos}\n@ENDCMP{suffix}\n0;JMP"
        )?;
        // Same sign: subtract and test, no overflow possible
        writeln!(
            self.out,
            "(EQ_SIGN{suffix})\n@R14\nD=M\n@R13\nD=M-D\n@TRUE{suffix}\nD;{jump}"
        )?;
        writeln!(
            self.out,
            "@SP\nM=M-1\nA=M\nA=A-1\nM=0\n@ENDCMP{suffix}\n0;JMP"
        )?;
        writeln!(
            self.out,
            "(TRUE{suffix})\n@SP\nM=M-1\nA=M\nA=A-1\nM=-1\n(ENDCMP{suffix})"
        )?;
        Ok(())
    }

    pub fn write_push(&mut self, segment: &str, index: u16, line: usize) -> Result<(), VmError> {
        writeln!(self.out, "// push {segment} {index}")?;

        let segment = Segment::from_str(segment).ok_or_else(|| VmError::SegmentViolation {
            segment: segment.to_string(),
            line,
        })?;

        match segment {
            Segment::Constant => {
                writeln!(self.out, "@{index}\nD=A")?;
            }
            Segment::Static => {
                writeln!(self.out, "@{}.{index}\nD=M", self.filename)?;
            }
            _ => {
                writeln!(self.out, "@{}", segment.base())?;
                if segment.is_indirect() {
                    writeln!(self.out, "A=M")?;
                }
                writeln!(self.out, "D=A\n@{index}\nA=A+D\nD=M")?;
            }
        }
        self.write_push_d()
    }

    pub fn write_pop(&mut self, segment: &str, index: u16, line: usize) -> Result<(), VmError> {
        writeln!(self.out, "// pop {segment} {index}")?;

        let segment = Segment::from_str(segment).ok_or_else(|| VmError::SegmentViolation {
            segment: segment.to_string(),
            line,
        })?;

        match segment {
            Segment::Constant => Err(VmError::SegmentViolation {
                segment: String::from("constant"),
                line,
            }),
            Segment::Static => {
                write_asm!(self.out,
                    "@SP"
                    "M=M-1"
                    "A=M"
                    "D=M"
                )?;
                writeln!(self.out, "@{}.{index}\nM=D", self.filename)?;
                Ok(())
            }
            _ => {
                // Target address -> R13, then pop into it
                writeln!(self.out, "@{}", segment.base())?;
                if segment.is_indirect() {
                    writeln!(self.out, "A=M")?;
                }
                writeln!(self.out, "D=A\n@{index}\nA=A+D\nD=A")?;
                write_asm!(self.out,
                    "@R13"
                    "M=D"
                    "@SP"
                    "M=M-1"
                    "A=M"
                    "D=M"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
        }
    }

    pub fn write_label(&mut self, label: &str) -> Result<(), VmError> {
        writeln!(self.out, "({})", self.qualified(label))?;
        Ok(())
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), VmError> {
        writeln!(self.out, "// goto {label}")?;
        writeln!(self.out, "@{}\n0;JMP", self.qualified(label))?;
        Ok(())
    }

    /// Pops the stack top and jumps when it is non-zero.
    pub fn write_if(&mut self, label: &str) -> Result<(), VmError> {
        writeln!(self.out, "// if-goto {label}")?;
        write_asm!(self.out,
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;
        writeln!(self.out, "@{}\nD;JNE", self.qualified(label))?;
        Ok(())
    }

    /// Emits the function entry label (the name is already class-qualified,
    /// so it is used verbatim) and allocates the local frame with zeroes.
    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<(), VmError> {
        writeln!(self.out, "// function {name} {n_locals}")?;
        self.current_function.clear();
        self.current_function.push_str(name);
        writeln!(self.out, "({name})")?;
        for _ in 0..n_locals {
            writeln!(self.out, "@0\nD=A")?;
            self.write_push_d()?;
        }
        Ok(())
    }

    /// Emits the calling convention: save the return address and the
    /// caller's pointers, reposition ARG and LCL, jump, then place the
    /// return label.
    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<(), VmError> {
        writeln!(self.out, "// call {name} {n_args}")?;

        self.call_counter += 1;
        let label = format!(
            "{}.{name}$returnAddress.{}",
            self.filename, self.call_counter
        );

        writeln!(self.out, "@{label}\nD=A")?;
        self.write_push_d()?;

        for pointer in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{pointer}\nD=M")?;
            self.write_push_d()?;
        }

        // ARG = SP - nArgs - 5
        writeln!(self.out, "@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D", n_args + 5)?;
        // LCL = SP
        write_asm!(self.out,
            "@SP"
            "D=M"
            "@LCL"
            "M=D"
        )?;
        writeln!(self.out, "@{name}\n0;JMP")?;
        writeln!(self.out, "({label})")?;
        Ok(())
    }

    /// Dismantles the current frame. The return address is read before the
    /// return value is planted, because `*(frame - 5)` is ARG[0] itself
    /// when the callee took no arguments.
    pub fn write_return(&mut self) -> Result<(), VmError> {
        write_asm!(self.out,
            "// return"
            // frame -> R13
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
            // return address = *(frame - 5) -> R14
            "@5"
            "D=D-A"
            "A=D"
            "D=M"
            "@R14"
            "M=D"
            // *ARG = pop()
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
            "@ARG"
            "A=M"
            "M=D"
            // SP = ARG + 1
            "@ARG"
            "D=M"
            "D=D+1"
            "@SP"
            "M=D"
        )?;

        for pointer in ["THAT", "THIS", "ARG", "LCL"] {
            writeln!(self.out, "@R13\nM=M-1\nA=M\nD=M\n@{pointer}\nM=D")?;
        }

        write_asm!(self.out,
            "@R14"
            "A=M"
            "0;JMP"
        )?;
        Ok(())
    }

    fn write_push_d(&mut self) -> Result<(), VmError> {
        write_asm!(self.out,
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )?;
        Ok(())
    }

    fn qualified(&self, label: &str) -> String {
        format!("{}.{}${label}", self.filename, self.current_function)
    }
}
