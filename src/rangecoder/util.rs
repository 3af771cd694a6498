pub fn min32(a: i32, b: i32) -> i32 {
    if a > b {
        b
    } else {
        a
    }
}
