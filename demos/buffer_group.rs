//! Let the kernel pick read buffers from a provided buffer group
//!
//! Writes a few messages into a pipe and reads each one back with a
//! buffer-select read, printing which buffer the kernel chose.

use uring_core::{
    ops::{ProvideBuffers, ReadSelect},
    Ring,
};

const GROUP: u16 = 1;
const BUF_LEN: u32 = 32;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut fds = [0i32; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    let mut ring = Ring::new(8)?;
    let mut pool = vec![0u8; BUF_LEN as usize * 4];

    ring.push(&ProvideBuffers::from_slice(&mut pool, BUF_LEN, GROUP, 0), 0)?;
    ring.submit()?;
    ring.wait_for_completion(None)?.into_result()?;

    for (i, msg) in ["first", "second", "third"].iter().enumerate() {
        unsafe { libc::write(write_fd, msg.as_ptr().cast(), msg.len()) };

        ring.get_next_submission_slot()?
            .prepare(&ReadSelect::new(read_fd, BUF_LEN))
            .select_buffer(GROUP)
            .set_user_data(i as u64 + 1);
        ring.submit()?;

        let cqe = ring.wait_for_completion(None)?;
        let id = cqe.buffer_id();
        let n = cqe.into_result()? as usize;

        match id {
            Some(id) => {
                let start = id as usize * BUF_LEN as usize;
                let text = String::from_utf8_lossy(&pool[start..start + n]);
                println!("read {:?} into buffer {}", text, id);
            }
            None => println!("read {} bytes without a selected buffer", n),
        }
    }

    unsafe {
        libc::close(read_fd);
        libc::close(write_fd);
    }
    Ok(())
}
