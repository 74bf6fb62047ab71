//! End-to-end compilation checks: Jack source in, exact VM text out.

use jack_compiler::{compile_to_vm, JackError};

fn compile(source: &str) -> String {
    String::from_utf8(compile_to_vm(source).expect("compilation failed")).unwrap()
}

#[test]
fn expression_evaluation_is_left_to_right() {
    let source = "\
class Main {
   function void main() {
      do Output.printInt(1 + (2 * 3));
      return;
   }
}
";
    assert_eq!(
        compile(source),
        "function Main.main 0\n\
         push constant 1\n\
         push constant 2\n\
         push constant 3\n\
         call Math.multiply 2\n\
         add\n\
         call Output.printInt 1\n\
         pop temp 0\n\
         push constant 0\n\
         return\n"
    );
}

#[test]
fn no_operator_precedence_without_parentheses() {
    let source = "class M { function int f() { return 2 + 3 * 4; } }";
    assert_eq!(
        compile(source),
        "function M.f 0\n\
         push constant 2\n\
         push constant 3\n\
         add\n\
         push constant 4\n\
         call Math.multiply 2\n\
         return\n"
    );
}

#[test]
fn array_assignment_defers_that_binding() {
    // let a[i + 1] = a[i]; with both sides going through pointer 1
    let source = "\
class Test {
   field Array a;
   field int i;
   method void move() {
      let a[i + 1] = a[i];
      return;
   }
}
";
    assert_eq!(
        compile(source),
        "function Test.move 0\n\
         push argument 0\n\
         pop pointer 0\n\
         push this 0\n\
         push this 1\n\
         push constant 1\n\
         add\n\
         add\n\
         push this 0\n\
         push this 1\n\
         add\n\
         pop pointer 1\n\
         push that 0\n\
         pop temp 0\n\
         pop pointer 1\n\
         push temp 0\n\
         pop that 0\n\
         push constant 0\n\
         return\n"
    );
}

#[test]
fn constructor_allocates_and_returns_this() {
    let source = "\
class Point {
   field int x, y;
   constructor Point new(int ax, int ay) {
      let x = ax;
      let y = ay;
      return this;
   }
   method int getX() {
      return x;
   }
}
";
    assert_eq!(
        compile(source),
        "function Point.new 0\n\
         push constant 2\n\
         call Memory.alloc 1\n\
         pop pointer 0\n\
         push argument 0\n\
         pop this 0\n\
         push argument 1\n\
         pop this 1\n\
         push pointer 0\n\
         return\n\
         function Point.getX 0\n\
         push argument 0\n\
         pop pointer 0\n\
         push this 0\n\
         return\n"
    );
}

#[test]
fn subroutine_call_receiver_forms() {
    let source = "\
class Game {
   field Square square;
   method void run() {
      do square.draw();
      do moveBall();
      do Screen.clearScreen();
      return;
   }
   method void moveBall() {
      return;
   }
}
";
    assert_eq!(
        compile(source),
        "function Game.run 0\n\
         push argument 0\n\
         pop pointer 0\n\
         push this 0\n\
         call Square.draw 1\n\
         pop temp 0\n\
         push pointer 0\n\
         call Game.moveBall 1\n\
         pop temp 0\n\
         call Screen.clearScreen 0\n\
         pop temp 0\n\
         push constant 0\n\
         return\n\
         function Game.moveBall 0\n\
         push argument 0\n\
         pop pointer 0\n\
         push constant 0\n\
         return\n"
    );
}

#[test]
fn control_flow_labels_count_up_across_subroutines() {
    let source = "\
class Flow {
   function int abs(int x) {
      if (x < 0) {
         return -x;
      } else {
         return x;
      }
   }
   function int sum(int n) {
      var int total;
      let total = 0;
      while (~(n = 0)) {
         let total = total + n;
         let n = n - 1;
      }
      return total;
   }
}
";
    assert_eq!(
        compile(source),
        "function Flow.abs 0\n\
         push argument 0\n\
         push constant 0\n\
         lt\n\
         not\n\
         if-goto IF_FALSE0\n\
         push argument 0\n\
         neg\n\
         return\n\
         goto IF_TRUE0\n\
         label IF_FALSE0\n\
         push argument 0\n\
         return\n\
         label IF_TRUE0\n\
         function Flow.sum 1\n\
         push constant 0\n\
         pop local 0\n\
         label WHILE_EXP1\n\
         push argument 0\n\
         push constant 0\n\
         eq\n\
         not\n\
         not\n\
         if-goto WHILE_END1\n\
         push local 0\n\
         push argument 0\n\
         add\n\
         pop local 0\n\
         push argument 0\n\
         push constant 1\n\
         sub\n\
         pop argument 0\n\
         goto WHILE_EXP1\n\
         label WHILE_END1\n\
         push local 0\n\
         return\n"
    );
}

#[test]
fn string_constants_build_through_the_os() {
    let source = "class Greet { function String hello() { return \"Hi!\"; } }";
    assert_eq!(
        compile(source),
        "function Greet.hello 0\n\
         push constant 3\n\
         call String.new 1\n\
         push constant 72\n\
         call String.appendChar 2\n\
         push constant 105\n\
         call String.appendChar 2\n\
         push constant 33\n\
         call String.appendChar 2\n\
         return\n"
    );
}

#[test]
fn shift_operators_are_unary_vm_shifts() {
    let source = "\
class Bits {
   function int double(int x) {
      return ^x;
   }
   function int halve(int x) {
      return #x;
   }
}
";
    assert_eq!(
        compile(source),
        "function Bits.double 0\n\
         push argument 0\n\
         shiftleft\n\
         return\n\
         function Bits.halve 0\n\
         push argument 0\n\
         shiftright\n\
         return\n"
    );
}

#[test]
fn keyword_constants_and_kind_segments() {
    let source = "\
class Kinds {
   static int counter;
   function void bump(boolean flag) {
      var int tmp;
      if (flag) {
         let counter = counter + 1;
      }
      let tmp = true;
      let tmp = false;
      let tmp = null;
      return;
   }
}
";
    assert_eq!(
        compile(source),
        "function Kinds.bump 1\n\
         push argument 0\n\
         not\n\
         if-goto IF_FALSE0\n\
         push static 0\n\
         push constant 1\n\
         add\n\
         pop static 0\n\
         goto IF_TRUE0\n\
         label IF_FALSE0\n\
         label IF_TRUE0\n\
         push constant 0\n\
         not\n\
         pop local 0\n\
         push constant 0\n\
         pop local 0\n\
         push constant 0\n\
         pop local 0\n\
         push constant 0\n\
         return\n"
    );
}

#[test]
fn array_read_in_expression() {
    let source = "\
class Arr {
   function int at(Array a, int i) {
      return a[i] + 1;
   }
}
";
    assert_eq!(
        compile(source),
        "function Arr.at 0\n\
         push argument 0\n\
         push argument 1\n\
         add\n\
         pop pointer 1\n\
         push that 0\n\
         push constant 1\n\
         add\n\
         return\n"
    );
}

#[test]
fn unresolved_variable_is_fatal() {
    let source = "class E { function void f() { let ghost = 1; return; } }";
    assert!(matches!(
        compile_to_vm(source).unwrap_err(),
        JackError::UnresolvedSymbol { .. }
    ));
}

#[test]
fn syntax_error_reports_token_and_context() {
    let source = "class E { function void f() { let = 1; } }";
    match compile_to_vm(source).unwrap_err() {
        JackError::UnexpectedToken {
            found, expected, ..
        } => {
            assert_eq!(expected, "an identifier");
            assert!(found.contains('='));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn truncated_class_is_fatal() {
    let source = "class E { function void f() {";
    assert!(matches!(
        compile_to_vm(source).unwrap_err(),
        JackError::UnexpectedEof
    ));
}
