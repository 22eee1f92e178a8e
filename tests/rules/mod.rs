mod cw059_test;
mod cw104_test;
