mod alg;

pub(crate) use alg::*;
