//! Boolean expressions of up to four variables: parse them, tabulate them,
//! lay them out on a Karnaugh map and minimize them with Quine–McCluskey.
//!
//! ```
//! use kmap_solver::{Form, Session};
//!
//! let mut session = Session::default();
//! let eval = session.evaluate("A(B+C)").unwrap();
//! assert_eq!(eval.table.minterms(), vec![5, 6, 7]);
//! assert_eq!(eval.minimized.expression, "AB + AC");
//! assert_eq!(session.simplify(Form::Pos).expression, "A(B + C)");
//! ```

pub mod context;
pub mod error;
pub mod eval;
pub mod kmap;
pub mod parser;
pub mod qm;
pub mod session;
pub mod token;
pub mod truth_table;

pub use context::{Env, VarContext};
pub use error::{Error, Result};
pub use eval::evaluate;
pub use kmap::{Cell, KMap, Layout};
pub use parser::to_postfix;
pub use qm::{minimize_pos, minimize_sop, Form, Implicant, Minimized};
pub use session::{parse_minterms, Evaluation, Import, Session};
pub use token::{tokenize, Token};
pub use truth_table::{Row, Source, TruthTable};
